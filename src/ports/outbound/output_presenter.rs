use crate::shared::Result;

/// OutputPresenter port for presenting final output
///
/// This port abstracts the output destination (stdout, file, etc.)
/// where the serialized document bytes are presented. Bytes rather than
/// a string because some target encodings are not guaranteed UTF-8.
pub trait OutputPresenter {
    /// Presents the serialized document to the output destination
    ///
    /// # Arguments
    /// * `content` - The serialized document bytes
    ///
    /// # Errors
    /// Returns an error if:
    /// - Writing to the output destination fails
    /// - File permissions prevent writing
    /// - Disk space is insufficient
    fn present(&self, content: &[u8]) -> Result<()>;
}
