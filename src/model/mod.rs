/// Intermediate document model
///
/// The format-neutral representation sitting between graph construction
/// and export. Exporters consume [`IntermediateDocument`] and nothing
/// earlier in the pipeline, so every target schema works from the same
/// deterministic view of the project.
pub mod normalizer;

pub use normalizer::Normalizer;

use crate::metadata::Author;
use std::collections::BTreeSet;

/// Name and version of this tool, recorded in generated documents
pub const TOOL_NAME: &str = env!("CARGO_PKG_NAME");
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stable component identifier: a package URL of the form
/// `pkg:pypi/{name}@{version}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(String);

impl ComponentId {
    /// Builds the purl for a normalized name and version.
    ///
    /// Names are already lowercase with runs of `-_.` collapsed, so only
    /// the version needs percent-encoding.
    pub fn purl(name: &str, version: &str) -> Self {
        Self(format!(
            "pkg:pypi/{}@{}",
            name,
            urlencoding::encode(version)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a component participates in the dependency graph.
///
/// A component can carry several roles at once when it is reachable
/// through more than one group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Declared directly by the project's default group
    Direct,
    /// Reached transitively through the default group
    Transitive,
    /// Reached through a named optional group
    Optional(String),
    /// Reached through the development group only
    Dev,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Direct => f.write_str("direct"),
            Role::Transitive => f.write_str("transitive"),
            Role::Optional(group) => write!(f, "optional:{}", group),
            Role::Dev => f.write_str("dev"),
        }
    }
}

/// A content hash of one distribution artifact, as `(algorithm, hex)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArtifactHash {
    pub file: String,
    pub algorithm: String,
    pub value: String,
}

/// One resolved package in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub version: String,
    pub roles: BTreeSet<Role>,
    pub authors: Vec<Author>,
    pub license: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub hashes: Vec<ArtifactHash>,
}

impl Component {
    /// True when the component is only ever reached through the
    /// development group.
    pub fn is_dev_only(&self) -> bool {
        self.roles.iter().all(|r| matches!(r, Role::Dev))
    }
}

/// A dependency relationship between two components, labelled with the
/// group it was resolved through.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Relationship {
    pub parent: ComponentId,
    pub child: ComponentId,
    pub group: String,
}

/// The format-neutral document handed to exporters.
///
/// `components` and `relationships` are sorted: components by
/// `(name, version)`, relationships by `(parent, child, group)`. Two
/// runs over the same inputs produce the same document apart from
/// `serial_number` and `timestamp`.
#[derive(Debug, Clone)]
pub struct IntermediateDocument {
    /// The project the document describes
    pub subject: Component,
    /// All dependency components, sorted, subject excluded
    pub components: Vec<Component>,
    pub relationships: Vec<Relationship>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub serial_number: uuid::Uuid,
}

impl IntermediateDocument {
    /// Looks up a component by id, including the subject
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        if self.subject.id == *id {
            return Some(&self.subject);
        }
        self.components.iter().find(|c| c.id == *id)
    }
}
