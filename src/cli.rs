use crate::export::{SchemaFamily, SpecVersion, Syntax};
use clap::Parser;
use std::path::PathBuf;

/// Render pdm.lock files as CycloneDX, SPDX and BuildInfo documents
#[derive(Parser, Debug)]
#[command(name = "pdm-sbom")]
#[command(version)]
#[command(about = "Render pdm.lock files as CycloneDX, SPDX and BuildInfo documents", long_about = None)]
pub struct Args {
    /// Target format family: cyclonedx, spdx, spdx3 or buildinfo
    #[arg(short, long, default_value = "cyclonedx")]
    pub format: SchemaFamily,

    /// Target schema version, e.g. 1.4 or 2.3 (defaults to the family's latest)
    #[arg(long = "spec-version", value_name = "VERSION")]
    pub spec_version: Option<SpecVersion>,

    /// Output syntax: json, yaml, xml, rdf-xml, tag-value or json-ld
    /// (defaults to the version's native syntax)
    #[arg(short = 's', long)]
    pub syntax: Option<Syntax>,

    /// Path to the project directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Site-packages directory to read installed distribution metadata from
    #[arg(short, long, value_name = "DIR")]
    pub environment: Option<PathBuf>,

    /// Exclude development-only dependencies from the document
    #[arg(long)]
    pub no_dev: bool,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_family_from_str() {
        assert_eq!(
            SchemaFamily::from_str("CycloneDX").unwrap(),
            SchemaFamily::CycloneDx
        );
        assert_eq!(SchemaFamily::from_str("spdx3").unwrap(), SchemaFamily::Spdx3);
        assert!(SchemaFamily::from_str("tsv").is_err());
    }

    #[test]
    fn test_syntax_from_str() {
        assert_eq!(Syntax::from_str("tag-value").unwrap(), Syntax::TagValue);
        assert_eq!(Syntax::from_str("YAML").unwrap(), Syntax::Yaml);
        let error = Syntax::from_str("csv").unwrap_err();
        assert!(error.contains("csv"));
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["pdm-sbom"]);
        assert_eq!(args.format, SchemaFamily::CycloneDx);
        assert!(args.spec_version.is_none());
        assert!(args.syntax.is_none());
        assert!(!args.no_dev);
    }

    #[test]
    fn test_full_invocation() {
        let args = Args::parse_from([
            "pdm-sbom",
            "--format",
            "spdx",
            "--spec-version",
            "2.2",
            "--syntax",
            "yaml",
            "--no-dev",
            "--output",
            "out.yaml",
        ]);
        assert_eq!(args.format, SchemaFamily::Spdx);
        assert_eq!(args.spec_version, Some(SpecVersion::new(2, 2)));
        assert_eq!(args.syntax, Some(Syntax::Yaml));
        assert!(args.no_dev);
        assert_eq!(args.output, Some(PathBuf::from("out.yaml")));
    }
}
