use super::parser::{
    ArtifactFile, LockDocument, ProjectManifest, Requirement, SourceLocator,
};
use crate::metadata::PackageMetadata;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::collections::{HashMap, HashSet};

/// Stable identity of one resolved dependency unit: normalized name plus
/// the version selected by the resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageKey {
    pub name: String,
    pub version: String,
}

impl PackageKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for PackageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// One package record owned by the graph arena.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    pub key: PackageKey,
    pub summary: Option<String>,
    pub source: Option<SourceLocator>,
    /// Groups the lock entry declares membership of
    pub groups: Vec<String>,
    /// Direct dependency requirements, in lock order
    pub requirements: Vec<Requirement>,
    pub files: Vec<ArtifactFile>,
}

/// A directed dependency edge labelled with the group context it was
/// reached through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub parent: usize,
    pub child: usize,
    pub group: String,
}

/// The assembled dependency graph.
///
/// Records live in an arena addressed by index; edges are
/// `(parent, child, group)` index triples, so cyclic lock data creates no
/// ownership cycle at the structural level. The graph is built once by
/// [`GraphBuilder`] and, apart from the enrichment pass attaching
/// metadata, immutable afterwards.
#[derive(Debug)]
pub struct DependencyGraph {
    records: Vec<PackageRecord>,
    root: usize,
    edges: Vec<Edge>,
    cycles: Vec<(usize, usize)>,
    metadata: Vec<Option<PackageMetadata>>,
}

impl DependencyGraph {
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn records(&self) -> &[PackageRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> &PackageRecord {
        &self.records[index]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges detected as closing a cycle, as `(from, to)` index pairs
    pub fn cycles(&self) -> &[(usize, usize)] {
        &self.cycles
    }

    pub fn metadata(&self, index: usize) -> Option<&PackageMetadata> {
        self.metadata[index].as_ref()
    }

    /// Attaches enrichment results to a node. Called by the metadata
    /// enricher; the root carries its metadata on the manifest instead.
    pub fn attach_metadata(&mut self, index: usize, metadata: PackageMetadata) {
        self.metadata[index] = Some(metadata);
    }

    pub fn package_count(&self) -> usize {
        // The root is the subject of the document, not a dependency
        self.records.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Builds a [`DependencyGraph`] from a parsed manifest and lock document.
///
/// Identity normalization happens at parse time; the builder resolves
/// every declared requirement against the lock's package set, labels edges
/// with the group they are reached through and detects cycles with a
/// per-path visited set (the same node may legitimately be reached again
/// via a different group).
pub struct GraphBuilder<'a> {
    manifest: &'a ProjectManifest,
    lock: &'a LockDocument,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(manifest: &'a ProjectManifest, lock: &'a LockDocument) -> Self {
        Self { manifest, lock }
    }

    /// Assembles the graph.
    ///
    /// # Errors
    /// * `SbomError::LockFormat` when one identity appears with two
    ///   different versions - a modeling conflict that is flagged, never
    ///   silently merged
    /// * `SbomError::UnresolvedDependency` when a requirement references
    ///   an identity absent from the package set
    pub fn build(&self) -> Result<DependencyGraph> {
        let (records, index) = self.build_arena()?;

        let mut state = TraversalState {
            records: &records,
            index: &index,
            edges: Vec::new(),
            seen_edges: HashSet::new(),
            cycles: Vec::new(),
            expanded: HashSet::new(),
        };

        for (group, requirements) in &self.manifest.dependencies {
            let mut path = vec![0];
            let mut path_set: HashSet<usize> = path.iter().copied().collect();
            for requirement in requirements {
                state.descend_into(0, requirement, group, &mut path, &mut path_set)?;
            }
        }

        let metadata = vec![None; records.len()];
        let edges = state.edges;
        let cycles = state.cycles;
        Ok(DependencyGraph {
            records,
            root: 0,
            edges,
            cycles,
            metadata,
        })
    }

    /// Builds the record arena: the project root at index 0, then one
    /// record per lock entry, keyed by normalized identity.
    fn build_arena(&self) -> Result<(Vec<PackageRecord>, HashMap<String, usize>)> {
        let mut records = vec![PackageRecord {
            key: PackageKey::new(self.manifest.name.clone(), self.manifest.version.clone()),
            summary: None,
            source: None,
            groups: Vec::new(),
            requirements: Vec::new(),
            files: Vec::new(),
        }];
        let mut index: HashMap<String, usize> = HashMap::new();
        index.insert(self.manifest.name.clone(), 0);

        for package in &self.lock.packages {
            if let Some(&existing) = index.get(&package.name) {
                let existing_version = &records[existing].key.version;
                return Err(SbomError::LockFormat {
                    details: format!(
                        "package '{}' appears with conflicting versions {} and {}",
                        package.name, existing_version, package.version
                    ),
                }
                .into());
            }

            index.insert(package.name.clone(), records.len());
            records.push(PackageRecord {
                key: PackageKey::new(package.name.clone(), package.version.clone()),
                summary: package.summary.clone(),
                source: package.source.clone(),
                groups: package.groups.clone(),
                requirements: package.dependencies.clone(),
                files: package.files.clone(),
            });
        }

        Ok((records, index))
    }
}

struct TraversalState<'a> {
    records: &'a [PackageRecord],
    index: &'a HashMap<String, usize>,
    edges: Vec<Edge>,
    seen_edges: HashSet<(usize, usize, String)>,
    cycles: Vec<(usize, usize)>,
    /// `(group, node)` pairs whose outgoing edges were already emitted;
    /// keeps the walk linear when a node is reachable via many paths
    expanded: HashSet<(String, usize)>,
}

impl TraversalState<'_> {
    /// Resolves one requirement of `parent`, records the edge and descends
    /// into the child unless that would close a cycle on the current path.
    fn descend_into(
        &mut self,
        parent: usize,
        requirement: &Requirement,
        group: &str,
        path: &mut Vec<usize>,
        path_set: &mut HashSet<usize>,
    ) -> Result<()> {
        let child = *self.index.get(&requirement.name).ok_or_else(|| {
            SbomError::UnresolvedDependency {
                parent: self.records[parent].key.to_string(),
                target: requirement.name.clone(),
            }
        })?;

        // A child locked only for other groups keeps its own label, so a
        // dev-group package stays a dev edge wherever it is reached from
        let child_groups = &self.records[child].groups;
        let group = if child_groups.is_empty() || child_groups.iter().any(|g| g == group) {
            group.to_string()
        } else {
            child_groups[0].clone()
        };
        let group = group.as_str();

        if self
            .seen_edges
            .insert((parent, child, group.to_string()))
        {
            self.edges.push(Edge {
                parent,
                child,
                group: group.to_string(),
            });
        }

        if path_set.contains(&child) {
            // Cycle: record it once and stop descending along this path
            if !self.cycles.contains(&(parent, child)) {
                self.cycles.push((parent, child));
            }
            return Ok(());
        }

        if !self.expanded.insert((group.to_string(), child)) {
            return Ok(());
        }

        path.push(child);
        path_set.insert(child);
        let requirements = self.records[child].requirements.clone();
        for requirement in &requirements {
            self.descend_into(child, requirement, group, path, path_set)?;
        }
        path.pop();
        path_set.remove(&child);

        Ok(())
    }
}
