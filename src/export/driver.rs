use super::codec::{self, Syntax};
use super::tree::SerializableDocument;
use crate::model::IntermediateDocument;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::collections::HashSet;

/// The supported target schema families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFamily {
    CycloneDx,
    Spdx,
    Spdx3,
    BuildInfo,
}

impl SchemaFamily {
    pub fn label(&self) -> &'static str {
        match self {
            SchemaFamily::CycloneDx => "cyclonedx",
            SchemaFamily::Spdx => "spdx",
            SchemaFamily::Spdx3 => "spdx3",
            SchemaFamily::BuildInfo => "buildinfo",
        }
    }
}

impl std::fmt::Display for SchemaFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for SchemaFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cyclonedx" | "cdx" => Ok(SchemaFamily::CycloneDx),
            "spdx" => Ok(SchemaFamily::Spdx),
            "spdx3" => Ok(SchemaFamily::Spdx3),
            "buildinfo" => Ok(SchemaFamily::BuildInfo),
            other => Err(format!(
                "unknown format '{}' (expected one of: cyclonedx, spdx, spdx3, buildinfo)",
                other
            )),
        }
    }
}

/// A target schema version, e.g. `1.4` or `2.3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecVersion {
    pub major: u16,
    pub minor: u16,
}

impl SpecVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn at_least(&self, major: u16, minor: u16) -> bool {
        *self >= SpecVersion::new(major, minor)
    }
}

impl std::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for SpecVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("invalid schema version '{}' (expected MAJOR.MINOR)", s))?;
        let major = major
            .parse()
            .map_err(|_| format!("invalid schema version '{}'", s))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("invalid schema version '{}'", s))?;
        Ok(SpecVersion::new(major, minor))
    }
}

/// FormatDriver - one target schema family's mapping logic
///
/// A driver declares which versions and syntaxes it implements and maps
/// the intermediate document onto the family's field set for one
/// concrete version. Version capability differences (a field existing
/// only from version X on, relationship vocabulary growing over time)
/// live entirely inside the driver; the registry only negotiates the
/// requested combination.
pub trait FormatDriver: Send + Sync {
    fn family(&self) -> SchemaFamily;

    /// Supported versions, ascending
    fn supported_versions(&self) -> &'static [SpecVersion];

    /// Syntaxes valid for the given version, default first
    fn supported_syntaxes(&self, version: SpecVersion) -> &'static [Syntax];

    /// Maps the document onto the target schema.
    ///
    /// The version and syntax have already been negotiated by the
    /// registry; the syntax is passed because some families shape XML
    /// and JSON trees differently.
    fn export(
        &self,
        document: &IntermediateDocument,
        version: SpecVersion,
        syntax: Syntax,
    ) -> Result<SerializableDocument>;
}

/// ExporterRegistry - negotiation front door for all format drivers
///
/// Runs the export state machine: the built document is validated for
/// referential integrity, mapped by the selected driver, then handed to
/// the syntax codec. A violation at any state aborts with no output.
pub struct ExporterRegistry {
    drivers: Vec<Box<dyn FormatDriver>>,
}

impl ExporterRegistry {
    pub fn new() -> Self {
        Self {
            drivers: vec![
                Box::new(super::cyclonedx::CycloneDxDriver),
                Box::new(super::spdx::SpdxDriver),
                Box::new(super::spdx3::Spdx3Driver),
                Box::new(super::buildinfo::BuildInfoDriver),
            ],
        }
    }

    pub fn driver(&self, family: SchemaFamily) -> &dyn FormatDriver {
        self.drivers
            .iter()
            .find(|d| d.family() == family)
            .map(|d| d.as_ref())
            .expect("all schema families are registered")
    }

    /// Latest version the family's driver implements
    pub fn default_version(&self, family: SchemaFamily) -> SpecVersion {
        *self
            .driver(family)
            .supported_versions()
            .last()
            .expect("drivers declare at least one version")
    }

    /// Validates, maps and serializes the document.
    ///
    /// # Arguments
    /// * `document` - The intermediate document to export
    /// * `family` - Target schema family
    /// * `version` - Target version; `None` selects the latest
    /// * `syntax` - Target syntax; `None` selects the version's default
    ///
    /// # Errors
    /// * `SbomError::UnsupportedVersion` / `UnsupportedSyntax` when the
    ///   requested combination is not implemented
    /// * `SbomError::StructuralIntegrity` when the document violates
    ///   referential integrity
    pub fn export(
        &self,
        document: &IntermediateDocument,
        family: SchemaFamily,
        version: Option<SpecVersion>,
        syntax: Option<Syntax>,
    ) -> Result<Vec<u8>> {
        let driver = self.driver(family);

        let version = version.unwrap_or_else(|| self.default_version(family));
        if !driver.supported_versions().contains(&version) {
            return Err(SbomError::UnsupportedVersion {
                family: family.to_string(),
                version: version.to_string(),
                supported: join_versions(driver.supported_versions()),
            }
            .into());
        }

        let syntaxes = driver.supported_syntaxes(version);
        let syntax = syntax.unwrap_or(syntaxes[0]);
        if !syntaxes.contains(&syntax) {
            return Err(SbomError::UnsupportedSyntax {
                family: family.to_string(),
                version: version.to_string(),
                syntax: syntax.to_string(),
                supported: syntaxes
                    .iter()
                    .map(|s| s.label())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into());
        }

        validate_integrity(document)?;
        let mapped = driver.export(document, version, syntax)?;
        codec::encode(&mapped, syntax)
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn join_versions(versions: &[SpecVersion]) -> String {
    versions
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Referential integrity check run before any driver maps the document:
/// component identifiers must be unique and every relationship endpoint
/// must name an existing component.
fn validate_integrity(document: &IntermediateDocument) -> Result<()> {
    let mut seen = HashSet::new();
    seen.insert(&document.subject.id);
    for component in &document.components {
        if !seen.insert(&component.id) {
            return Err(SbomError::StructuralIntegrity {
                details: format!("duplicate component identifier '{}'", component.id),
            }
            .into());
        }
    }

    for relationship in &document.relationships {
        for id in [&relationship.parent, &relationship.child] {
            if !seen.contains(id) {
                return Err(SbomError::StructuralIntegrity {
                    details: format!(
                        "relationship references unknown component '{}'",
                        id
                    ),
                }
                .into());
            }
        }
    }
    Ok(())
}
