/// Versioned export of the intermediate document
///
/// The [`ExporterRegistry`] negotiates a (family, version, syntax)
/// combination, validates the document, lets the family's
/// [`FormatDriver`] map it onto a [`SerializableDocument`] and hands the
/// result to the syntax codec. Version capability differences live
/// inside the drivers; everything outside this module is
/// format-agnostic.
pub mod buildinfo;
pub mod codec;
pub mod cyclonedx;
pub mod driver;
pub mod spdx;
pub mod spdx3;
pub mod tree;

pub use codec::Syntax;
pub use driver::{ExporterRegistry, FormatDriver, SchemaFamily, SpecVersion};
pub use tree::{Node, SerializableDocument};
