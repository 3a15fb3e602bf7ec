use crate::shared::Result;
use std::path::Path;

/// ManifestReader port for reading the project manifest
///
/// This port abstracts the file system operations needed to read
/// the pyproject.toml file from a project directory.
pub trait ManifestReader {
    /// Reads the pyproject.toml file from the specified project directory
    ///
    /// # Arguments
    /// * `project_path` - Path to the project directory
    ///
    /// # Returns
    /// The raw content of the pyproject.toml file as a string
    ///
    /// # Errors
    /// Returns an error if:
    /// - The pyproject.toml file does not exist
    /// - The file cannot be read due to permissions or I/O errors
    fn read_manifest(&self, project_path: &Path) -> Result<String>;
}
