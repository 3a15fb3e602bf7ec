/// Shared utilities and error types
///
/// Common infrastructure used by every layer: the error taxonomy,
/// the `Result` alias and process exit codes.
pub mod error;
pub mod result;

pub use error::{ExitCode, SbomError};
pub use result::Result;
