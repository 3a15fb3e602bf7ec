/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod console;
pub mod filesystem;
pub mod metadata;

pub use console::StderrProgressReporter;
pub use filesystem::{FileSystemReader, FileSystemWriter, StdoutPresenter};
pub use metadata::{CachingMetadataSource, DeclaredMetadataSource, DistInfoMetadataSource};
