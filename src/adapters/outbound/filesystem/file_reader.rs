use crate::ports::outbound::{LockfileReader, ManifestReader};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// FileSystemReader adapter for reading project files
///
/// This adapter implements both LockfileReader and ManifestReader ports,
/// providing file system access for reading the lock description and
/// project manifest.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }

    fn read(&self, project_path: &Path, file_name: &str, hint: &str) -> Result<String> {
        let path = project_path.join(file_name);
        if !path.exists() {
            return Err(SbomError::FileRead {
                path: path.clone(),
                details: format!("{} does not exist. {}", file_name, hint),
            }
            .into());
        }

        fs::read_to_string(&path).map_err(|e| {
            SbomError::FileRead {
                path,
                details: e.to_string(),
            }
            .into()
        })
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LockfileReader for FileSystemReader {
    fn read_lockfile(&self, project_path: &Path) -> Result<String> {
        self.read(
            project_path,
            "pdm.lock",
            "Run `pdm lock` in the project first, or point --path at a PDM project root.",
        )
    }
}

impl ManifestReader for FileSystemReader {
    fn read_manifest(&self, project_path: &Path) -> Result<String> {
        self.read(
            project_path,
            "pyproject.toml",
            "Point --path at a PDM project root.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_lockfile_success() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("pdm.lock"), "lock content").unwrap();

        let reader = FileSystemReader::new();
        let content = reader.read_lockfile(temp_dir.path()).unwrap();

        assert_eq!(content, "lock content");
    }

    #[test]
    fn test_read_lockfile_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let reader = FileSystemReader::new();
        let result = reader.read_lockfile(temp_dir.path());

        let message = format!("{}", result.unwrap_err());
        assert!(message.contains("pdm.lock"));
    }

    #[test]
    fn test_read_manifest_success() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("pyproject.toml"),
            "[project]\nname = \"demo\"\n",
        )
        .unwrap();

        let reader = FileSystemReader::new();
        let content = reader.read_manifest(temp_dir.path()).unwrap();

        assert!(content.contains("demo"));
    }

    #[test]
    fn test_read_manifest_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let reader = FileSystemReader::new();
        let result = reader.read_manifest(temp_dir.path());

        let message = format!("{}", result.unwrap_err());
        assert!(message.contains("pyproject.toml"));
    }
}
