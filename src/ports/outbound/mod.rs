/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, console, installed
/// distribution metadata).
pub mod lockfile_reader;
pub mod manifest_reader;
pub mod metadata_source;
pub mod output_presenter;
pub mod progress_reporter;

pub use lockfile_reader::LockfileReader;
pub use manifest_reader::ManifestReader;
pub use metadata_source::MetadataSource;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
