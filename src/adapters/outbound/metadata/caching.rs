use crate::metadata::PackageMetadata;
use crate::ports::outbound::MetadataSource;
use crate::shared::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Cache key for metadata lookups
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct CacheKey {
    package_name: String,
    version: String,
}

impl CacheKey {
    fn new(package_name: &str, version: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            version: version.to_string(),
        }
    }
}

/// CachingMetadataSource wraps a MetadataSource and adds in-memory caching.
///
/// This adapter implements the decorator pattern to add caching
/// capability to any MetadataSource implementation. Negative results are
/// cached too, so an absent package is only scanned for once. The cache
/// is thread-safe and suitable for concurrent access.
pub struct CachingMetadataSource<S: MetadataSource> {
    inner: S,
    cache: Arc<DashMap<CacheKey, Option<PackageMetadata>>>,
}

impl<S: MetadataSource> CachingMetadataSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Arc::new(DashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<S: MetadataSource> MetadataSource for CachingMetadataSource<S> {
    async fn lookup(&self, package_name: &str, version: &str) -> Result<Option<PackageMetadata>> {
        let key = CacheKey::new(package_name, version);

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let metadata = self.inner.lookup(package_name, version).await?;
        self.cache.insert(key, metadata.clone());
        Ok(metadata)
    }

    fn label(&self) -> &str {
        self.inner.label()
    }
}
