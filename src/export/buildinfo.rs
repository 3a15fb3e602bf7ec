use super::codec::Syntax;
use super::driver::{FormatDriver, SchemaFamily, SpecVersion};
use super::tree::{Node, SerializableDocument};
use crate::model::{Component, ComponentId, IntermediateDocument, TOOL_NAME, TOOL_VERSION};
use crate::shared::Result;
use chrono::SecondsFormat;
use std::collections::{BTreeSet, HashSet};

const VERSIONS: &[SpecVersion] = &[SpecVersion::new(1, 0)];

/// JFrog BuildInfo, JSON only, single version `1.0`.
///
/// The project is one module; every component becomes a dependency
/// entry with its group names as `scopes` and `requestedBy` listing the
/// dependency chains back to the module. Unknown facts render as empty
/// collections, the format has no sentinel strings.
pub struct BuildInfoDriver;

impl FormatDriver for BuildInfoDriver {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::BuildInfo
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        VERSIONS
    }

    fn supported_syntaxes(&self, _version: SpecVersion) -> &'static [Syntax] {
        &[Syntax::Json]
    }

    fn export(
        &self,
        document: &IntermediateDocument,
        _version: SpecVersion,
        _syntax: Syntax,
    ) -> Result<SerializableDocument> {
        let mut root = Node::object();
        root.push("version", Node::str("1.0"));
        root.push("name", Node::str(&document.subject.name));
        root.push("number", Node::str(&document.subject.version));
        root.push(
            "started",
            Node::str(
                document
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        );

        let mut agent = Node::object();
        agent.push("name", Node::str(TOOL_NAME));
        agent.push("version", Node::str(TOOL_VERSION));
        root.push("buildAgent", agent);

        let mut module = Node::object();
        module.push("id", Node::str(module_id(&document.subject)));
        module.push("artifacts", Node::Array(Vec::new()));
        module.push(
            "dependencies",
            Node::Array(
                document
                    .components
                    .iter()
                    .map(|c| dependency_entry(document, c))
                    .collect(),
            ),
        );
        root.push("modules", Node::Array(vec![module]));

        Ok(SerializableDocument::new("buildInfo", root))
    }
}

fn module_id(component: &Component) -> String {
    format!("{}:{}", component.name, component.version)
}

fn dependency_entry(document: &IntermediateDocument, component: &Component) -> Node {
    let mut node = Node::object();
    node.push("id", Node::str(module_id(component)));

    for algorithm in ["sha256", "sha1", "md5"] {
        if let Some(hash) = component
            .hashes
            .iter()
            .find(|h| h.algorithm == algorithm)
        {
            node.push(algorithm, Node::str(&hash.value));
        }
    }

    let scopes: BTreeSet<&str> = document
        .relationships
        .iter()
        .filter(|r| r.child == component.id)
        .map(|r| r.group.as_str())
        .collect();
    node.push(
        "scopes",
        Node::Array(scopes.into_iter().map(Node::str).collect()),
    );

    let mut chains = Vec::new();
    let mut on_path = HashSet::new();
    collect_chains(document, &component.id, &mut Vec::new(), &mut on_path, &mut chains);
    chains.sort();
    chains.dedup();
    node.push(
        "requestedBy",
        Node::Array(
            chains
                .into_iter()
                .map(|chain| Node::Array(chain.into_iter().map(Node::Str).collect()))
                .collect(),
        ),
    );
    node
}

/// Walks incoming edges from `id` up to the root module, collecting every
/// requester chain (nearest requester first). Cyclic lock data is cut by
/// the per-path visited set.
fn collect_chains(
    document: &IntermediateDocument,
    id: &ComponentId,
    prefix: &mut Vec<String>,
    on_path: &mut HashSet<ComponentId>,
    chains: &mut Vec<Vec<String>>,
) {
    if !on_path.insert(id.clone()) {
        return;
    }

    for relationship in document.relationships.iter().filter(|r| &r.child == id) {
        if relationship.parent == document.subject.id {
            let mut chain = prefix.clone();
            chain.push(module_id(&document.subject));
            chains.push(chain);
        } else if let Some(parent) = document.component(&relationship.parent) {
            prefix.push(module_id(parent));
            collect_chains(document, &parent.id, prefix, on_path, chains);
            prefix.pop();
        }
    }

    on_path.remove(id);
}
