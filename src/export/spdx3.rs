use super::codec::Syntax;
use super::driver::{FormatDriver, SchemaFamily, SpecVersion};
use super::tree::{Node, SerializableDocument};
use crate::model::{Component, IntermediateDocument, TOOL_NAME, TOOL_VERSION};
use crate::shared::Result;
use chrono::SecondsFormat;
use uuid::Uuid;

const VERSIONS: &[SpecVersion] = &[SpecVersion::new(3, 0)];

const CONTEXT: &str = "https://spdx.org/rdf/3.0.0/spdx-context.jsonld";
const CREATION_INFO_ID: &str = "_:creationinfo";

/// SPDX 3.0, JSON-LD only.
///
/// The document is a flat `@graph`: one `software_Package` element per
/// component, one dependency relationship per edge carrying the
/// lifecycle scope (`runtime`/`development`) and conditionality
/// (`required`/`optional`), and an `software_Sbom` element tying the
/// graph to its root.
pub struct Spdx3Driver;

impl FormatDriver for Spdx3Driver {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::Spdx3
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        VERSIONS
    }

    fn supported_syntaxes(&self, _version: SpecVersion) -> &'static [Syntax] {
        &[Syntax::JsonLd]
    }

    fn export(
        &self,
        document: &IntermediateDocument,
        _version: SpecVersion,
        _syntax: Syntax,
    ) -> Result<SerializableDocument> {
        let tool_id = element_id("tool", &format!("{}-{}", TOOL_NAME, TOOL_VERSION));

        let mut graph = Vec::new();

        let mut creation = Node::object();
        creation.push("type", Node::str("CreationInfo"));
        creation.push("@id", Node::str(CREATION_INFO_ID));
        creation.push("specVersion", Node::str("3.0.0"));
        creation.push(
            "created",
            Node::str(
                document
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        );
        creation.push("createdBy", Node::Array(vec![Node::str(&tool_id)]));
        graph.push(creation);

        let mut tool = Node::object();
        tool.push("type", Node::str("Tool"));
        tool.push("spdxId", Node::str(&tool_id));
        tool.push("creationInfo", Node::str(CREATION_INFO_ID));
        tool.push("name", Node::str(format!("{} {}", TOOL_NAME, TOOL_VERSION)));
        graph.push(tool);

        let mut element_ids = Vec::new();
        for component in
            std::iter::once(&document.subject).chain(document.components.iter())
        {
            let id = package_id(component);
            element_ids.push(id.clone());
            graph.push(package_element(component, &id, component.roles.is_empty()));
        }

        for relationship in &document.relationships {
            let parent = document.component(&relationship.parent);
            let child = document.component(&relationship.child);
            if let (Some(parent), Some(child)) = (parent, child) {
                graph.push(dependency_element(parent, child, &relationship.group));
                element_ids.push(relationship_id(parent, child, &relationship.group));
            }
        }

        let mut sbom = Node::object();
        sbom.push("type", Node::str("software_Sbom"));
        sbom.push(
            "spdxId",
            Node::str(format!("urn:uuid:{}", document.serial_number)),
        );
        sbom.push("creationInfo", Node::str(CREATION_INFO_ID));
        sbom.push("software_sbomType", Node::Array(vec![Node::str("build")]));
        sbom.push(
            "rootElement",
            Node::Array(vec![Node::str(package_id(&document.subject))]),
        );
        sbom.push(
            "element",
            Node::Array(element_ids.iter().map(Node::str).collect()),
        );
        graph.push(sbom);

        let mut root = Node::object();
        root.push("@context", Node::str(CONTEXT));
        root.push("@graph", Node::Array(graph));
        Ok(SerializableDocument::new("Document", root))
    }
}

fn element_id(kind: &str, seed: &str) -> String {
    format!(
        "urn:uuid:{}",
        Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{}:{}", kind, seed).as_bytes())
    )
}

fn package_id(component: &Component) -> String {
    element_id("package", component.id.as_str())
}

fn relationship_id(parent: &Component, child: &Component, group: &str) -> String {
    element_id(
        "relationship",
        &format!("{}>{}@{}", parent.id, child.id, group),
    )
}

fn package_element(component: &Component, id: &str, subject: bool) -> Node {
    let mut node = Node::object();
    node.push("type", Node::str("software_Package"));
    node.push("spdxId", Node::str(id));
    node.push("creationInfo", Node::str(CREATION_INFO_ID));
    node.push("name", Node::str(&component.name));
    node.push("software_packageVersion", Node::str(&component.version));
    node.push(
        "software_primaryPurpose",
        Node::str(if subject { "application" } else { "library" }),
    );
    node.push_opt(
        "description",
        component.description.as_deref().map(Node::str),
    );
    node.push_opt(
        "software_homePage",
        component.homepage.as_deref().map(Node::str),
    );
    node.push(
        "externalIdentifier",
        Node::Array(vec![Node::Map(vec![
            ("type".to_string(), Node::str("ExternalIdentifier")),
            (
                "externalIdentifierType".to_string(),
                Node::str("packageUrl"),
            ),
            ("identifier".to_string(), Node::str(component.id.as_str())),
        ])]),
    );
    if !component.hashes.is_empty() {
        node.push(
            "verifiedUsing",
            Node::Array(
                component
                    .hashes
                    .iter()
                    .map(|h| {
                        Node::Map(vec![
                            ("type".to_string(), Node::str("Hash")),
                            ("algorithm".to_string(), Node::str(&h.algorithm)),
                            ("hashValue".to_string(), Node::str(&h.value)),
                        ])
                    })
                    .collect(),
            ),
        );
    }
    node
}

fn dependency_element(parent: &Component, child: &Component, group: &str) -> Node {
    let scope = if group == "dev" { "development" } else { "runtime" };
    let conditionality = match group {
        "default" | "dev" => "required",
        _ => "optional",
    };

    let mut node = Node::object();
    node.push(
        "type",
        Node::str("software_SoftwareDependencyRelationship"),
    );
    node.push(
        "spdxId",
        Node::str(relationship_id(parent, child, group)),
    );
    node.push("creationInfo", Node::str(CREATION_INFO_ID));
    node.push("relationshipType", Node::str("dependsOn"));
    node.push("from", Node::str(package_id(parent)));
    node.push("to", Node::Array(vec![Node::str(package_id(child))]));
    node.push("software_scope", Node::str(scope));
    node.push("software_conditionality", Node::str(conditionality));
    node
}
