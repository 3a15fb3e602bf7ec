use crate::export::{SchemaFamily, SpecVersion, Syntax};
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// Request parameters for document export
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Path to the project directory
    pub project_path: PathBuf,
    /// Target schema family
    pub family: SchemaFamily,
    /// Target schema version; `None` selects the family's latest
    pub version: Option<SpecVersion>,
    /// Target serialization syntax; `None` selects the family default
    pub syntax: Option<Syntax>,
    /// Whether development-only dependencies are included
    pub include_dev: bool,
}

/// Response from document export
#[derive(Debug, Clone)]
pub struct ExportResponse {
    /// The serialized document bytes
    pub content: Vec<u8>,
}

impl ExportResponse {
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }
}

/// SbomExportPort - Inbound port for the export use case
///
/// This port defines the interface that external adapters (CLI, API, etc.)
/// use to trigger document export. It represents the application's
/// public API.
#[async_trait::async_trait]
pub trait SbomExportPort {
    /// Builds, enriches and exports a document for the specified project
    ///
    /// # Arguments
    /// * `request` - Request parameters containing project path and
    ///   format selection
    ///
    /// # Returns
    /// A response containing the serialized document bytes
    ///
    /// # Errors
    /// Returns an error if:
    /// - The project directory does not exist or is invalid
    /// - The lock description or manifest cannot be read or parsed
    /// - The requested version or syntax is unsupported
    /// - Serialization fails
    async fn export(&self, request: ExportRequest) -> Result<ExportResponse>;

    /// Validates a project path
    ///
    /// # Arguments
    /// * `path` - Path to validate
    ///
    /// # Errors
    /// Returns an error if the path is invalid
    fn validate_project_path(&self, path: &Path) -> Result<()>;
}
