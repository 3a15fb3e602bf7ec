/// Mock implementations of the outbound ports for integration tests
pub mod mock_metadata_source;
pub mod mock_progress_reporter;
pub mod mock_readers;

pub use mock_metadata_source::MockMetadataSource;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_readers::{MockLockfileReader, MockManifestReader};
