use crate::ports::outbound::OutputPresenter;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// FileSystemWriter adapter for writing output to files
///
/// Writes through a temporary file in the target directory and persists
/// it into place, so an aborted run never leaves a partially written
/// document behind.
pub struct FileSystemWriter {
    output_path: PathBuf,
}

impl FileSystemWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    fn parent_directory(&self) -> Result<&Path> {
        let parent = match self.output_path.parent() {
            Some(parent) if parent != Path::new("") => parent,
            _ => Path::new("."),
        };
        if !parent.exists() {
            return Err(SbomError::FileWrite {
                path: self.output_path.clone(),
                details: format!("Parent directory does not exist: {}", parent.display()),
            }
            .into());
        }
        Ok(parent)
    }
}

impl OutputPresenter for FileSystemWriter {
    fn present(&self, content: &[u8]) -> Result<()> {
        let parent = self.parent_directory()?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| SbomError::FileWrite {
            path: self.output_path.clone(),
            details: e.to_string(),
        })?;
        temp.write_all(content).map_err(|e| SbomError::FileWrite {
            path: self.output_path.clone(),
            details: e.to_string(),
        })?;
        temp.persist(&self.output_path)
            .map_err(|e| SbomError::FileWrite {
                path: self.output_path.clone(),
                details: e.to_string(),
            })?;

        eprintln!("✅ Output complete: {}", self.output_path.display());
        Ok(())
    }
}

/// StdoutPresenter adapter for writing output to stdout
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPresenter for StdoutPresenter {
    fn present(&self, content: &[u8]) -> Result<()> {
        io::stdout()
            .write_all(content)
            .map_err(|e| anyhow::anyhow!("Failed to write to stdout: {}", e))?;
        Ok(())
    }
}
