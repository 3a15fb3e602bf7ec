use crate::metadata::PackageMetadata;
use crate::shared::Result;
use async_trait::async_trait;

/// MetadataSource port for looking up package metadata
///
/// This port abstracts the places authorship, license and description
/// facts can come from: installed distribution metadata, declared
/// overrides, or a caching layer wrapping another source.
///
/// # Async Support
/// Lookups are async so the enricher can run them concurrently with a
/// bounded degree of parallelism. Implementations must be `Send + Sync`.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Looks up metadata for a specific package version
    ///
    /// # Arguments
    /// * `package_name` - Normalized name of the package
    /// * `version` - Version of the package
    ///
    /// # Returns
    /// `Some(metadata)` when the source knows the package, `None` when it
    /// does not. A `None` is not an error: the enricher falls through to
    /// the next source in its precedence order.
    ///
    /// # Errors
    /// Returns an error only when the source itself fails (unreadable
    /// metadata files, malformed headers); "not found" is `Ok(None)`.
    async fn lookup(&self, package_name: &str, version: &str) -> Result<Option<PackageMetadata>>;

    /// A short label naming the source, used in warnings
    fn label(&self) -> &str;
}
