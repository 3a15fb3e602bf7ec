use crate::metadata::{Author, PackageMetadata};
use crate::shared::error::SbomError;
use crate::shared::Result;
use serde::Deserialize;

/// Name of the group holding runtime dependencies
pub const DEFAULT_GROUP: &str = "default";

/// Name of the group holding development dependencies
pub const DEV_GROUP: &str = "dev";

/// Lock format versions this parser understands (inclusive lower bound,
/// exclusive upper bound)
const MIN_LOCK_VERSION: (u64, u64, u64) = (4, 4, 1);
const MAX_LOCK_VERSION: (u64, u64, u64) = (5, 0, 0);

/// A dependency requirement reduced to its resolvable parts.
///
/// Requirement strings in the lock carry specifiers and environment markers
/// (`pkg[extra]>=1.0; python_version < "3.12"`); only the normalized name
/// and the requested extras matter for graph construction - the lock data
/// is authoritative about which version was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
}

impl Requirement {
    /// Parses a PEP 508 requirement string down to name and extras.
    ///
    /// # Errors
    /// Returns `SbomError::LockFormat` when the string has no package name.
    pub fn parse(raw: &str) -> Result<Self> {
        let unmarked = raw.split(';').next().unwrap_or(raw).trim();

        let (name_part, extras) = match unmarked.find('[') {
            Some(open) => {
                let close = unmarked.find(']').ok_or_else(|| SbomError::LockFormat {
                    details: format!("unterminated extras in requirement '{}'", raw),
                })?;
                let extras = unmarked[open + 1..close]
                    .split(',')
                    .map(|e| e.trim().to_string())
                    .filter(|e| !e.is_empty())
                    .collect();
                (&unmarked[..open], extras)
            }
            None => (unmarked, Vec::new()),
        };

        let name: String = name_part
            .chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();

        if name.is_empty() {
            return Err(SbomError::LockFormat {
                details: format!("requirement '{}' has no package name", raw),
            }
            .into());
        }

        Ok(Self {
            name: normalize_name(&name),
            extras,
        })
    }
}

/// Normalizes a package identity per PEP 503: lowercase, with runs of
/// `-`, `_` and `.` collapsed to a single `-`. Lookups are consistent
/// regardless of source casing.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_was_sep {
                normalized.push('-');
            }
            last_was_sep = true;
        } else {
            normalized.extend(c.to_lowercase());
            last_was_sep = false;
        }
    }
    normalized
}

/// A distribution artifact referenced by the lock, with its composite
/// `algorithm:hex` hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub file: String,
    pub hash: String,
}

impl ArtifactFile {
    pub fn hash_algorithm(&self) -> &str {
        self.hash.split(':').next().unwrap_or("")
    }

    pub fn hash_value(&self) -> &str {
        self.hash.splitn(2, ':').nth(1).unwrap_or("")
    }
}

/// Where a locked package was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    Registry(String),
    Url(String),
    Path(String),
}

/// One resolved package entry from the lock.
#[derive(Debug, Clone)]
pub struct LockedPackage {
    /// Normalized identity
    pub name: String,
    pub version: String,
    pub summary: Option<String>,
    pub source: Option<SourceLocator>,
    /// Groups this entry was locked for
    pub groups: Vec<String>,
    /// Extras this entry was locked with
    pub extras: Vec<String>,
    /// Direct dependencies, in lock order
    pub dependencies: Vec<Requirement>,
    pub files: Vec<ArtifactFile>,
}

/// The parsed lock description: declared groups plus the package closure.
#[derive(Debug, Clone)]
pub struct LockDocument {
    pub groups: Vec<String>,
    pub packages: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct RawLock {
    #[serde(default)]
    metadata: RawLockMetadata,
    #[serde(default, rename = "package")]
    packages: Vec<RawPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLockMetadata {
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    lock_version: String,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    extras: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    files: Vec<RawFile>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    registry: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    file: String,
    hash: String,
}

/// Parses raw lock content into a [`LockDocument`].
///
/// # Errors
/// Returns `SbomError::LockFormat` when the content is not valid TOML, the
/// lock format version is outside the supported range, or a package entry
/// is missing its identity or version.
pub fn parse_lock(content: &str) -> Result<LockDocument> {
    let raw: RawLock = toml::from_str(content).map_err(|e| SbomError::LockFormat {
        details: e.to_string(),
    })?;

    check_lock_version(&raw.metadata.lock_version)?;

    let mut packages = Vec::with_capacity(raw.packages.len());
    for (index, pkg) in raw.packages.into_iter().enumerate() {
        let name = pkg.name.filter(|n| !n.is_empty()).ok_or_else(|| {
            SbomError::LockFormat {
                details: format!("package entry {} has no name", index),
            }
        })?;
        let version = pkg.version.filter(|v| !v.is_empty()).ok_or_else(|| {
            SbomError::LockFormat {
                details: format!("package entry '{}' has no version", name),
            }
        })?;

        let dependencies = pkg
            .dependencies
            .iter()
            .map(|raw| Requirement::parse(raw))
            .collect::<Result<Vec<_>>>()?;

        packages.push(LockedPackage {
            name: normalize_name(&name),
            version,
            summary: pkg.summary.filter(|s| !s.is_empty()),
            source: pkg.source.and_then(|s| {
                s.registry
                    .map(SourceLocator::Registry)
                    .or(s.url.map(SourceLocator::Url))
                    .or(s.path.map(SourceLocator::Path))
            }),
            groups: pkg.groups,
            extras: pkg.extras,
            dependencies,
            files: pkg
                .files
                .into_iter()
                .map(|f| ArtifactFile {
                    file: f.file,
                    hash: f.hash,
                })
                .collect(),
        });
    }

    Ok(LockDocument {
        groups: raw.metadata.groups,
        packages,
    })
}

fn check_lock_version(value: &str) -> Result<()> {
    let mut parts = value.split('.').map(|p| p.parse::<u64>().ok());
    let version = (
        parts.next().flatten(),
        parts.next().flatten(),
        parts.next().flatten(),
    );
    let version = match version {
        (Some(major), Some(minor), Some(patch)) => (major, minor, patch),
        _ => {
            return Err(SbomError::LockFormat {
                details: format!("missing or invalid lock_version '{}'", value),
            }
            .into())
        }
    };

    if version < MIN_LOCK_VERSION || version >= MAX_LOCK_VERSION {
        return Err(SbomError::LockFormat {
            details: format!(
                "unsupported lock_version {} (supported: >= {}.{}.{}, < {}.0.0)",
                value, MIN_LOCK_VERSION.0, MIN_LOCK_VERSION.1, MIN_LOCK_VERSION.2, MAX_LOCK_VERSION.0
            ),
        }
        .into());
    }

    Ok(())
}

/// Project identity and per-group requirement lists, read from the
/// project manifest (pyproject.toml).
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    pub name: String,
    pub version: String,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub authors: Vec<Author>,
    /// Requirement lists keyed by group name; `default` holds the runtime
    /// dependencies, `dev` the merged development groups, every other key
    /// is a named optional extra.
    pub dependencies: Vec<(String, Vec<Requirement>)>,
    /// Per-package metadata facts declared in `[tool.pdm-sbom.package-metadata]`,
    /// taking precedence over whatever the installed distribution reports.
    pub metadata_overrides: Vec<(String, PackageMetadata)>,
}

impl ProjectManifest {
    pub fn group(&self, name: &str) -> &[Requirement] {
        self.dependencies
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, reqs)| reqs.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    project: Option<RawProject>,
    #[serde(default)]
    tool: RawTool,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    license: Option<RawLicense>,
    #[serde(default)]
    authors: Vec<RawAuthor>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default, rename = "optional-dependencies")]
    optional_dependencies: toml::value::Table,
    #[serde(default)]
    urls: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLicense {
    Expression(String),
    Table {
        text: Option<String>,
        file: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTool {
    #[serde(default)]
    pdm: RawPdmTool,
    #[serde(default, rename = "pdm-sbom")]
    pdm_sbom: RawPdmSbomTool,
}

#[derive(Debug, Default, Deserialize)]
struct RawPdmTool {
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: toml::value::Table,
}

#[derive(Debug, Default, Deserialize)]
struct RawPdmSbomTool {
    #[serde(default, rename = "package-metadata")]
    package_metadata: std::collections::BTreeMap<String, RawMetadataOverride>,
}

#[derive(Debug, Deserialize)]
struct RawMetadataOverride {
    #[serde(default)]
    authors: Vec<RawAuthor>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
}

/// Parses the project manifest into a [`ProjectManifest`].
///
/// All `[tool.pdm.dev-dependencies]` groups are merged into the single
/// `dev` group; each `[project.optional-dependencies]` key becomes a named
/// optional group.
///
/// # Errors
/// Returns `SbomError::ManifestFormat` when the manifest is not valid TOML
/// or the project name or version is missing.
pub fn parse_manifest(content: &str) -> Result<ProjectManifest> {
    let raw: RawManifest = toml::from_str(content).map_err(|e| SbomError::ManifestFormat {
        details: e.to_string(),
    })?;

    let project = raw.project.ok_or_else(|| SbomError::ManifestFormat {
        details: "missing [project] table".to_string(),
    })?;

    let name = project
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| SbomError::ManifestFormat {
            details: "missing project name".to_string(),
        })?;
    let version = project
        .version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SbomError::ManifestFormat {
            details: format!("project '{}' has no version", name),
        })?;

    let mut dependencies = vec![(
        DEFAULT_GROUP.to_string(),
        parse_requirement_list(&project.dependencies)?,
    )];

    for (group, value) in &project.optional_dependencies {
        dependencies.push((group.clone(), parse_requirement_value(group, value)?));
    }

    let mut dev_requirements = Vec::new();
    for (group, value) in &raw.tool.pdm.dev_dependencies {
        dev_requirements.extend(parse_requirement_value(group, value)?);
    }
    if !dev_requirements.is_empty() {
        dependencies.push((DEV_GROUP.to_string(), dev_requirements));
    }

    let metadata_overrides = raw
        .tool
        .pdm_sbom
        .package_metadata
        .into_iter()
        .map(|(name, raw)| {
            (
                name,
                PackageMetadata {
                    authors: raw
                        .authors
                        .into_iter()
                        .filter_map(|a| a.name.map(|name| Author::new(name, a.email)))
                        .collect(),
                    license: raw.license.filter(|l| !l.is_empty()),
                    description: raw.description.filter(|d| !d.is_empty()),
                    homepage: raw.homepage.filter(|h| !h.is_empty()),
                },
            )
        })
        .collect();

    Ok(ProjectManifest {
        name: normalize_name(&name),
        version,
        license: project.license.and_then(|l| match l {
            RawLicense::Expression(text) => Some(text),
            RawLicense::Table { text, .. } => text,
        }),
        homepage: project
            .urls
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("homepage"))
            .map(|(_, url)| url.clone()),
        authors: project
            .authors
            .into_iter()
            .filter_map(|a| a.name.map(|name| Author::new(name, a.email)))
            .collect(),
        dependencies,
        metadata_overrides,
    })
}

fn parse_requirement_list(raw: &[String]) -> Result<Vec<Requirement>> {
    raw.iter().map(|r| Requirement::parse(r)).collect()
}

fn parse_requirement_value(group: &str, value: &toml::Value) -> Result<Vec<Requirement>> {
    let entries = value
        .as_array()
        .ok_or_else(|| SbomError::ManifestFormat {
            details: format!("dependency group '{}' is not an array", group),
        })?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .ok_or_else(|| {
                    SbomError::ManifestFormat {
                        details: format!("dependency group '{}' contains a non-string entry", group),
                    }
                    .into()
                })
                .and_then(Requirement::parse)
        })
        .collect()
}
