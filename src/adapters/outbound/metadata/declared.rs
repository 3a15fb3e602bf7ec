use crate::lock::parser::normalize_name;
use crate::metadata::PackageMetadata;
use crate::ports::outbound::MetadataSource;
use crate::shared::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// DeclaredMetadataSource serves project-declared metadata overrides
///
/// Facts declared explicitly for a package take precedence over whatever
/// the installed distribution reports; placing this source before the
/// dist-info source in the enricher's list encodes that precedence.
pub struct DeclaredMetadataSource {
    overrides: HashMap<String, PackageMetadata>,
}

impl DeclaredMetadataSource {
    pub fn new(entries: impl IntoIterator<Item = (String, PackageMetadata)>) -> Self {
        Self {
            overrides: entries
                .into_iter()
                .map(|(name, metadata)| (normalize_name(&name), metadata))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

#[async_trait]
impl MetadataSource for DeclaredMetadataSource {
    async fn lookup(&self, package_name: &str, _version: &str) -> Result<Option<PackageMetadata>> {
        Ok(self.overrides.get(package_name).cloned())
    }

    fn label(&self) -> &str {
        "declared"
    }
}
