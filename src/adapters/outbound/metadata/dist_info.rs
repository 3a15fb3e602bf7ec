use crate::lock::parser::normalize_name;
use crate::metadata::{Author, LicensePolicy, PackageMetadata};
use crate::ports::outbound::MetadataSource;
use crate::shared::Result;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// DistInfoMetadataSource reads installed distribution metadata
///
/// Scans a Python environment's site-packages directory for
/// `{name}-{version}.dist-info/METADATA` files and parses the RFC 822
/// style headers (`Author`, `Author-email`, `License`,
/// `License-Expression`, `Classifier`, `Summary`, `Home-page`,
/// `Project-URL`). License selection follows [`LicensePolicy`].
pub struct DistInfoMetadataSource {
    site_packages: PathBuf,
}

impl DistInfoMetadataSource {
    /// # Arguments
    /// * `site_packages` - Directory containing the `*.dist-info` entries
    pub fn new(site_packages: PathBuf) -> Self {
        Self { site_packages }
    }

    fn metadata_path(&self, name: &str, version: &str) -> Option<PathBuf> {
        let entries = fs::read_dir(&self.site_packages).ok()?;
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let dir_name = file_name.to_string_lossy();
            let Some(stem) = dir_name.strip_suffix(".dist-info") else {
                continue;
            };
            let Some((dir_name_part, dir_version)) = stem.rsplit_once('-') else {
                continue;
            };
            if normalize_name(dir_name_part) == name && dir_version == version {
                let path = entry.path().join("METADATA");
                if path.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }
}

#[async_trait]
impl MetadataSource for DistInfoMetadataSource {
    async fn lookup(&self, package_name: &str, version: &str) -> Result<Option<PackageMetadata>> {
        let Some(path) = self.metadata_path(package_name, version) else {
            return Ok(None);
        };
        let content = fs::read_to_string(&path)?;
        Ok(Some(parse_metadata_headers(&content)))
    }

    fn label(&self) -> &str {
        "dist-info"
    }
}

/// Parses the header block of a core-metadata file. Headers end at the
/// first blank line; continuation lines are indented.
fn parse_metadata_headers(content: &str) -> PackageMetadata {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in content.lines() {
        if line.is_empty() {
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push('\n');
                value.push_str(line.trim_start());
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let first = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .filter(|v| !v.is_empty())
    };
    let classifiers: Vec<String> = headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("Classifier"))
        .map(|(_, v)| v.clone())
        .collect();

    let mut authors = Vec::new();
    if let Some(value) = first("Author-email") {
        authors.extend(parse_contacts(&value));
    }
    if authors.is_empty() {
        if let Some(name) = first("Author") {
            authors.push(Author::new(name, None));
        }
    }

    let homepage = first("Home-page").or_else(|| {
        headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("Project-URL"))
            .find_map(|(_, v)| {
                let (label, url) = v.split_once(',')?;
                label
                    .trim()
                    .eq_ignore_ascii_case("homepage")
                    .then(|| url.trim().to_string())
            })
    });

    PackageMetadata {
        authors,
        license: LicensePolicy::select_license(
            first("License"),
            first("License-Expression"),
            &classifiers,
        ),
        description: first("Summary"),
        homepage,
    }
}

/// Parses `Author-email` style contact lists: comma-separated
/// `Name <addr>` entries, or bare addresses.
fn parse_contacts(value: &str) -> Vec<Author> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('<') {
            Some((name, rest)) => {
                let email = rest.trim_end_matches('>').trim().to_string();
                let name = name.trim().trim_matches('"').to_string();
                if name.is_empty() {
                    Author::new(email.clone(), Some(email))
                } else {
                    Author::new(name, Some(email))
                }
            }
            None => Author::new(entry, None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const METADATA: &str = "Metadata-Version: 2.1\n\
Name: Demo-Lib\n\
Version: 2.1\n\
Summary: A demonstration library\n\
Home-page: https://example.org/demo\n\
Author-email: Jane Doe <jane@example.org>\n\
License: MIT\n\
Classifier: License :: OSI Approved :: MIT License\n\
\n\
Long description follows.\n";

    fn environment_with(dir_name: &str, metadata: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let dist_info = temp_dir.path().join(dir_name);
        fs::create_dir(&dist_info).unwrap();
        fs::write(dist_info.join("METADATA"), metadata).unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_lookup_parses_headers() {
        let env = environment_with("Demo_Lib-2.1.dist-info", METADATA);
        let source = DistInfoMetadataSource::new(env.path().to_path_buf());

        let metadata = source.lookup("demo-lib", "2.1").await.unwrap().unwrap();

        assert_eq!(metadata.license.as_deref(), Some("MIT"));
        assert_eq!(metadata.description.as_deref(), Some("A demonstration library"));
        assert_eq!(metadata.homepage.as_deref(), Some("https://example.org/demo"));
        assert_eq!(metadata.authors.len(), 1);
        assert_eq!(metadata.authors[0].name, "Jane Doe");
        assert_eq!(metadata.authors[0].email.as_deref(), Some("jane@example.org"));
    }

    #[tokio::test]
    async fn test_lookup_unknown_package_is_none() {
        let env = environment_with("Demo_Lib-2.1.dist-info", METADATA);
        let source = DistInfoMetadataSource::new(env.path().to_path_buf());

        assert!(source.lookup("other", "1.0").await.unwrap().is_none());
        // same name, different version
        assert!(source.lookup("demo-lib", "3.0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_missing_environment_is_none() {
        let source = DistInfoMetadataSource::new(PathBuf::from("/nonexistent/site-packages"));
        assert!(source.lookup("demo-lib", "2.1").await.unwrap().is_none());
    }

    #[test]
    fn test_license_falls_back_to_classifier() {
        let metadata = parse_metadata_headers(
            "Name: x\nVersion: 1\nLicense: UNKNOWN\nClassifier: License :: OSI Approved :: BSD License\n\nbody\n",
        );
        assert_eq!(metadata.license.as_deref(), Some("BSD License"));
    }

    #[test]
    fn test_parse_contacts_variants() {
        let contacts = parse_contacts("Jane <jane@x.org>, bob@y.org");
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name, "Jane");
        assert_eq!(contacts[1].name, "bob@y.org");
        assert_eq!(contacts[1].email, None);
    }

    #[test]
    fn test_project_url_homepage_fallback() {
        let metadata = parse_metadata_headers(
            "Name: x\nVersion: 1\nProject-URL: Homepage, https://example.org\n\n",
        );
        assert_eq!(metadata.homepage.as_deref(), Some("https://example.org"));
    }
}
