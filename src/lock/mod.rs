/// Lock description parsing and dependency graph construction
///
/// The lock module is the first pipeline stage: it turns the raw pdm.lock
/// and project manifest TOML into a deduplicated, cycle-safe
/// [`DependencyGraph`] with group-labelled edges.
pub mod graph;
pub mod parser;

pub use graph::{DependencyGraph, Edge, GraphBuilder, PackageKey, PackageRecord};
pub use parser::{
    parse_lock, parse_manifest, ArtifactFile, LockDocument, LockedPackage, ProjectManifest,
    Requirement, SourceLocator, DEFAULT_GROUP, DEV_GROUP,
};
