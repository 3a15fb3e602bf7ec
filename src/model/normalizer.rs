use super::{
    ArtifactHash, Component, ComponentId, IntermediateDocument, Relationship, Role,
};
use crate::lock::{DependencyGraph, Edge, ProjectManifest, DEFAULT_GROUP, DEV_GROUP};
use std::collections::{BTreeSet, HashMap};

/// Normalizer turning the dependency graph into an
/// [`IntermediateDocument`].
///
/// Each edge contributes one role to its child: edges from the root carry
/// `Direct`, `Dev` or `Optional` depending on their group, deeper edges
/// carry `Transitive`, `Dev` or `Optional`. A component reachable through
/// several groups accumulates all of them. The output is fully sorted so
/// repeated runs are byte-identical apart from timestamp and serial
/// number.
pub struct Normalizer<'a> {
    graph: &'a DependencyGraph,
    manifest: &'a ProjectManifest,
    include_dev: bool,
}

impl<'a> Normalizer<'a> {
    pub fn new(graph: &'a DependencyGraph, manifest: &'a ProjectManifest) -> Self {
        Self {
            graph,
            manifest,
            include_dev: true,
        }
    }

    /// Excludes components only reachable through the development group
    pub fn include_dev(mut self, include_dev: bool) -> Self {
        self.include_dev = include_dev;
        self
    }

    pub fn normalize(&self) -> IntermediateDocument {
        let root = self.graph.root();

        let surviving: Vec<&Edge> = self
            .graph
            .edges()
            .iter()
            .filter(|e| self.include_dev || e.group != DEV_GROUP)
            .collect();

        // Dropping the dev group can orphan whole subtrees, so membership
        // is reachability from the root over the surviving edges
        let mut adjacency: HashMap<usize, Vec<&Edge>> = HashMap::new();
        for &edge in &surviving {
            adjacency.entry(edge.parent).or_default().push(edge);
        }
        let mut reachable: BTreeSet<usize> = BTreeSet::new();
        reachable.insert(root);
        let mut queue = vec![root];
        while let Some(node) = queue.pop() {
            for edge in adjacency.get(&node).into_iter().flatten() {
                if reachable.insert(edge.child) {
                    queue.push(edge.child);
                }
            }
        }

        // Accumulate roles per node from the edges that survive filtering
        let mut roles: HashMap<usize, BTreeSet<Role>> = HashMap::new();
        let mut relationships: Vec<Relationship> = Vec::new();

        for edge in surviving {
            if !reachable.contains(&edge.parent) {
                continue;
            }

            let role = if edge.parent == root {
                match edge.group.as_str() {
                    DEFAULT_GROUP => Role::Direct,
                    DEV_GROUP => Role::Dev,
                    group => Role::Optional(group.to_string()),
                }
            } else {
                match edge.group.as_str() {
                    DEFAULT_GROUP => Role::Transitive,
                    DEV_GROUP => Role::Dev,
                    group => Role::Optional(group.to_string()),
                }
            };
            roles.entry(edge.child).or_default().insert(role);

            let parent_key = &self.graph.record(edge.parent).key;
            let child_key = &self.graph.record(edge.child).key;
            relationships.push(Relationship {
                parent: ComponentId::purl(&parent_key.name, &parent_key.version),
                child: ComponentId::purl(&child_key.name, &child_key.version),
                group: edge.group.clone(),
            });
        }

        let mut components: Vec<Component> = roles
            .into_iter()
            .map(|(index, roles)| self.build_component(index, roles))
            .collect();
        components.sort_by(|a, b| (&a.name, &a.version).cmp(&(&b.name, &b.version)));

        relationships.sort();
        relationships.dedup();

        IntermediateDocument {
            subject: self.build_subject(),
            components,
            relationships,
            timestamp: chrono::Utc::now(),
            serial_number: uuid::Uuid::new_v4(),
        }
    }

    fn build_component(&self, index: usize, roles: BTreeSet<Role>) -> Component {
        let record = self.graph.record(index);
        let metadata = self.graph.metadata(index);

        let hashes = record
            .files
            .iter()
            .filter(|f| !f.hash.is_empty())
            .map(|f| ArtifactHash {
                file: f.file.clone(),
                algorithm: f.hash_algorithm().to_string(),
                value: f.hash_value().to_string(),
            })
            .collect();

        Component {
            id: ComponentId::purl(&record.key.name, &record.key.version),
            name: record.key.name.clone(),
            version: record.key.version.clone(),
            roles,
            authors: metadata.map(|m| m.authors.clone()).unwrap_or_default(),
            license: metadata.and_then(|m| m.license.clone()),
            description: metadata
                .and_then(|m| m.description.clone())
                .or_else(|| record.summary.clone()),
            homepage: metadata.and_then(|m| m.homepage.clone()),
            hashes,
        }
    }

    /// The subject draws its facts from the manifest, not from the
    /// enrichment pass.
    fn build_subject(&self) -> Component {
        Component {
            id: ComponentId::purl(&self.manifest.name, &self.manifest.version),
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
            roles: BTreeSet::new(),
            authors: self.manifest.authors.clone(),
            license: self.manifest.license.clone(),
            description: None,
            homepage: self.manifest.homepage.clone(),
            hashes: Vec::new(),
        }
    }
}
