use async_trait::async_trait;
use pdm_sbom::metadata::Author;
use pdm_sbom::prelude::*;
use std::collections::HashMap;

/// MockMetadataSource serving canned metadata per (name, version)
pub struct MockMetadataSource {
    entries: HashMap<(String, String), PackageMetadata>,
}

impl MockMetadataSource {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_package(
        mut self,
        name: &str,
        version: &str,
        license: &str,
        description: &str,
    ) -> Self {
        self.entries.insert(
            (name.to_string(), version.to_string()),
            PackageMetadata {
                authors: vec![Author::new("Test Author", None)],
                license: Some(license.to_string()),
                description: Some(description.to_string()),
                homepage: None,
            },
        );
        self
    }
}

impl Default for MockMetadataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataSource for MockMetadataSource {
    async fn lookup(&self, package_name: &str, version: &str) -> Result<Option<PackageMetadata>> {
        Ok(self
            .entries
            .get(&(package_name.to_string(), version.to_string()))
            .cloned())
    }

    fn label(&self) -> &str {
        "mock"
    }
}
