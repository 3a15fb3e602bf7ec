use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - the document was generated and written
    Success = 0,
    /// The lock data or the export request was rejected
    GenerationFailed = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (file I/O error, internal error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::GenerationFailed => write!(f, "Generation Failed (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for SBOM generation.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
///
/// Structural errors (`LockFormat`, `UnresolvedDependency`,
/// `StructuralIntegrity`) and request errors (`UnsupportedVersion`,
/// `UnsupportedSyntax`) abort the run; `MetadataLookupTimeout` is recovered
/// inside the enricher and never reaches the top level.
#[derive(Debug, Error)]
pub enum SbomError {
    #[error("Malformed lock data: {details}\n\n💡 Hint: Please verify that the pdm.lock file is in the correct format")]
    LockFormat { details: String },

    #[error("Unresolved dependency: package '{parent}' references '{target}', which is not part of the lock data")]
    UnresolvedDependency { parent: String, target: String },

    #[error("Malformed project manifest: {details}\n\n💡 Hint: Please verify the [project] table of pyproject.toml")]
    ManifestFormat { details: String },

    #[error("Metadata lookup for {package} {version} timed out after {timeout_secs}s")]
    MetadataLookupTimeout {
        package: String,
        version: String,
        timeout_secs: u64,
    },

    #[error("Schema version {version} is not supported by the {family} exporter (supported: {supported})")]
    UnsupportedVersion {
        family: String,
        version: String,
        supported: String,
    },

    #[error("Output syntax '{syntax}' is not valid for {family} {version} (valid: {supported})")]
    UnsupportedSyntax {
        family: String,
        version: String,
        syntax: String,
        supported: String,
    },

    #[error("Document failed integrity validation: {details}")]
    StructuralIntegrity { details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileRead { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWrite { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid project directory")]
    InvalidProjectPath { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GenerationFailed.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::GenerationFailed),
            "Generation Failed (1)"
        );
    }

    #[test]
    fn test_lock_format_display() {
        let error = SbomError::LockFormat {
            details: "package entry 3 has no version".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Malformed lock data"));
        assert!(display.contains("package entry 3 has no version"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_unresolved_dependency_display() {
        let error = SbomError::UnresolvedDependency {
            parent: "requests".to_string(),
            target: "urllib3".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("requests"));
        assert!(display.contains("urllib3"));
        assert!(display.contains("not part of the lock data"));
    }

    #[test]
    fn test_unsupported_version_display() {
        let error = SbomError::UnsupportedVersion {
            family: "cyclonedx".to_string(),
            version: "9.9".to_string(),
            supported: "1.0, 1.1, 1.2, 1.3, 1.4, 1.5".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("9.9"));
        assert!(display.contains("cyclonedx"));
        assert!(display.contains("1.5"));
    }

    #[test]
    fn test_unsupported_syntax_display() {
        let error = SbomError::UnsupportedSyntax {
            family: "spdx".to_string(),
            version: "2.0".to_string(),
            syntax: "json".to_string(),
            supported: "tag-value, rdf-xml".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("'json'"));
        assert!(display.contains("spdx 2.0"));
    }

    #[test]
    fn test_structural_integrity_display() {
        let error = SbomError::StructuralIntegrity {
            details: "relationship references unknown component pkg:pypi/ghost@1.0".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("integrity validation"));
        assert!(display.contains("pkg:pypi/ghost@1.0"));
    }

    #[test]
    fn test_metadata_timeout_display() {
        let error = SbomError::MetadataLookupTimeout {
            package: "numpy".to_string(),
            version: "1.24.0".to_string(),
            timeout_secs: 10,
        };
        let display = format!("{}", error);
        assert!(display.contains("numpy"));
        assert!(display.contains("timed out after 10s"));
    }

    #[test]
    fn test_file_read_error_display() {
        let error = SbomError::FileRead {
            path: PathBuf::from("/test/pdm.lock"),
            details: "File not found".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to read file"));
        assert!(display.contains("/test/pdm.lock"));
    }
}
