use pdm_sbom::prelude::*;
use std::path::Path;

/// MockLockfileReader returning fixed lock content
pub struct MockLockfileReader {
    content: String,
}

impl MockLockfileReader {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl LockfileReader for MockLockfileReader {
    fn read_lockfile(&self, _project_path: &Path) -> Result<String> {
        Ok(self.content.clone())
    }
}

/// MockManifestReader returning fixed manifest content
pub struct MockManifestReader {
    content: String,
}

impl MockManifestReader {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl ManifestReader for MockManifestReader {
    fn read_manifest(&self, _project_path: &Path) -> Result<String> {
        Ok(self.content.clone())
    }
}
