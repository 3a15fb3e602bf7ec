use super::codec::Syntax;
use super::driver::{FormatDriver, SchemaFamily, SpecVersion};
use super::tree::{Node, SerializableDocument};
use crate::model::{Component, IntermediateDocument, Role, TOOL_NAME, TOOL_VERSION};
use crate::shared::Result;
use chrono::SecondsFormat;

const VERSIONS: &[SpecVersion] = &[
    SpecVersion::new(1, 0),
    SpecVersion::new(1, 1),
    SpecVersion::new(1, 2),
    SpecVersion::new(1, 3),
    SpecVersion::new(1, 4),
    SpecVersion::new(1, 5),
];

/// CycloneDX 1.0 - 1.5.
///
/// Capability gates: JSON exists from 1.2 (XML everywhere); `metadata`,
/// `dependencies` and the tool list from 1.2; `externalReferences` from
/// 1.1. Roles map onto scopes: direct and transitive dependencies are
/// `required`, optional extras `optional`, development-only components
/// `excluded`. Unknown optional fields are simply omitted.
pub struct CycloneDxDriver;

impl FormatDriver for CycloneDxDriver {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::CycloneDx
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        VERSIONS
    }

    fn supported_syntaxes(&self, version: SpecVersion) -> &'static [Syntax] {
        if version.at_least(1, 2) {
            &[Syntax::Json, Syntax::Xml]
        } else {
            &[Syntax::Xml]
        }
    }

    fn export(
        &self,
        document: &IntermediateDocument,
        version: SpecVersion,
        syntax: Syntax,
    ) -> Result<SerializableDocument> {
        let tree = match syntax {
            Syntax::Xml => self.map_xml(document, version),
            _ => self.map_json(document, version),
        };
        Ok(tree)
    }
}

impl CycloneDxDriver {
    fn map_json(&self, document: &IntermediateDocument, version: SpecVersion) -> SerializableDocument {
        let mut root = Node::object();
        root.push("bomFormat", Node::str("CycloneDX"));
        root.push("specVersion", Node::str(version.to_string()));
        root.push(
            "serialNumber",
            Node::str(format!("urn:uuid:{}", document.serial_number)),
        );
        root.push("version", Node::Int(1));

        // metadata (incl. the subject component) exists from 1.2
        if version.at_least(1, 2) {
            let mut metadata = Node::object();
            metadata.push(
                "timestamp",
                Node::str(
                    document
                        .timestamp
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
            );
            let mut tool = Node::object();
            tool.push("name", Node::str(TOOL_NAME));
            tool.push("version", Node::str(TOOL_VERSION));
            metadata.push("tools", Node::Array(vec![tool]));
            metadata.push(
                "component",
                self.json_component(&document.subject, version, true),
            );
            root.push("metadata", metadata);
        }

        root.push(
            "components",
            Node::Array(
                document
                    .components
                    .iter()
                    .map(|c| self.json_component(c, version, false))
                    .collect(),
            ),
        );

        if version.at_least(1, 2) {
            root.push("dependencies", self.json_dependencies(document));
        }

        SerializableDocument::new("bom", root)
    }

    fn json_component(&self, component: &Component, version: SpecVersion, subject: bool) -> Node {
        let mut node = Node::object();
        node.push(
            "type",
            Node::str(if subject { "application" } else { "library" }),
        );
        node.push("bom-ref", Node::str(component.id.as_str()));
        node.push("name", Node::str(&component.name));
        node.push("version", Node::str(&component.version));
        if !component.authors.is_empty() {
            let authors = component
                .authors
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            node.push("author", Node::str(authors));
        }
        node.push_opt(
            "description",
            component.description.as_deref().map(Node::str),
        );
        if !subject {
            node.push("scope", Node::str(scope_of(component)));
        }

        if let Some(license) = &component.license {
            let entry = if version.at_least(1, 2) {
                Node::Map(vec![("expression".to_string(), Node::str(license))])
            } else {
                Node::Map(vec![(
                    "license".to_string(),
                    Node::Map(vec![("name".to_string(), Node::str(license))]),
                )])
            };
            node.push("licenses", Node::Array(vec![entry]));
        }

        if !component.hashes.is_empty() {
            node.push(
                "hashes",
                Node::Array(
                    component
                        .hashes
                        .iter()
                        .map(|h| {
                            Node::Map(vec![
                                ("alg".to_string(), Node::str(hash_alg(&h.algorithm))),
                                ("content".to_string(), Node::str(&h.value)),
                            ])
                        })
                        .collect(),
                ),
            );
        }

        node.push("purl", Node::str(component.id.as_str()));

        if version.at_least(1, 1) {
            if let Some(homepage) = &component.homepage {
                node.push(
                    "externalReferences",
                    Node::Array(vec![Node::Map(vec![
                        ("type".to_string(), Node::str("website")),
                        ("url".to_string(), Node::str(homepage)),
                    ])]),
                );
            }
        }
        node
    }

    fn json_dependencies(&self, document: &IntermediateDocument) -> Node {
        let mut entries = Vec::new();
        for id in std::iter::once(&document.subject.id)
            .chain(document.components.iter().map(|c| &c.id))
        {
            let depends_on: Vec<Node> = document
                .relationships
                .iter()
                .filter(|r| &r.parent == id)
                .map(|r| Node::str(r.child.as_str()))
                .collect();
            let mut entry = Node::object();
            entry.push("ref", Node::str(id.as_str()));
            entry.push("dependsOn", Node::Array(depends_on));
            entries.push(entry);
        }
        Node::Array(entries)
    }

    fn map_xml(&self, document: &IntermediateDocument, version: SpecVersion) -> SerializableDocument {
        let mut root = Node::object();
        root.push(
            "@xmlns",
            Node::str(format!("http://cyclonedx.org/schema/bom/{}", version)),
        );
        root.push(
            "@serialNumber",
            Node::str(format!("urn:uuid:{}", document.serial_number)),
        );
        root.push("@version", Node::str("1"));

        if version.at_least(1, 2) {
            let mut metadata = Node::object();
            metadata.push(
                "timestamp",
                Node::str(
                    document
                        .timestamp
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
            );
            let mut tool = Node::object();
            tool.push("name", Node::str(TOOL_NAME));
            tool.push("version", Node::str(TOOL_VERSION));
            metadata.push("tools", Node::Map(vec![("tool".to_string(), Node::Array(vec![tool]))]));
            metadata.push(
                "component",
                self.xml_component(&document.subject, version, true),
            );
            root.push("metadata", metadata);
        }

        root.push(
            "components",
            Node::Map(vec![(
                "component".to_string(),
                Node::Array(
                    document
                        .components
                        .iter()
                        .map(|c| self.xml_component(c, version, false))
                        .collect(),
                ),
            )]),
        );

        if version.at_least(1, 2) {
            root.push("dependencies", self.xml_dependencies(document));
        }

        SerializableDocument::new("bom", root)
    }

    fn xml_component(&self, component: &Component, version: SpecVersion, subject: bool) -> Node {
        let mut node = Node::object();
        node.push(
            "@type",
            Node::str(if subject { "application" } else { "library" }),
        );
        node.push("@bom-ref", Node::str(component.id.as_str()));
        node.push("name", Node::str(&component.name));
        node.push("version", Node::str(&component.version));
        if !component.authors.is_empty() {
            let authors = component
                .authors
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            node.push("author", Node::str(authors));
        }
        node.push_opt(
            "description",
            component.description.as_deref().map(Node::str),
        );
        if !subject {
            node.push("scope", Node::str(scope_of(component)));
        }

        if let Some(license) = &component.license {
            let entry = if version.at_least(1, 2) {
                ("expression".to_string(), Node::str(license))
            } else {
                (
                    "license".to_string(),
                    Node::Map(vec![("name".to_string(), Node::str(license))]),
                )
            };
            node.push("licenses", Node::Map(vec![entry]));
        }

        if !component.hashes.is_empty() {
            node.push(
                "hashes",
                Node::Map(vec![(
                    "hash".to_string(),
                    Node::Array(
                        component
                            .hashes
                            .iter()
                            .map(|h| {
                                Node::Map(vec![
                                    ("@alg".to_string(), Node::str(hash_alg(&h.algorithm))),
                                    ("#text".to_string(), Node::str(&h.value)),
                                ])
                            })
                            .collect(),
                    ),
                )]),
            );
        }

        node.push("purl", Node::str(component.id.as_str()));

        if version.at_least(1, 1) {
            if let Some(homepage) = &component.homepage {
                node.push(
                    "externalReferences",
                    Node::Map(vec![(
                        "reference".to_string(),
                        Node::Array(vec![Node::Map(vec![
                            ("@type".to_string(), Node::str("website")),
                            ("url".to_string(), Node::str(homepage)),
                        ])]),
                    )]),
                );
            }
        }
        node
    }

    fn xml_dependencies(&self, document: &IntermediateDocument) -> Node {
        let mut entries = Vec::new();
        for id in std::iter::once(&document.subject.id)
            .chain(document.components.iter().map(|c| &c.id))
        {
            let children: Vec<Node> = document
                .relationships
                .iter()
                .filter(|r| &r.parent == id)
                .map(|r| Node::Map(vec![("@ref".to_string(), Node::str(r.child.as_str()))]))
                .collect();
            let mut entry = Node::object();
            entry.push("@ref", Node::str(id.as_str()));
            if !children.is_empty() {
                entry.push("dependency", Node::Array(children));
            }
            entries.push(entry);
        }
        Node::Map(vec![("dependency".to_string(), Node::Array(entries))])
    }
}

/// Strongest applicable scope wins: a component needed by the default
/// group is `required` even when the development group also pulls it in.
fn scope_of(component: &Component) -> &'static str {
    let mut scope = "excluded";
    for role in &component.roles {
        match role {
            Role::Direct | Role::Transitive => return "required",
            Role::Optional(_) => scope = "optional",
            Role::Dev => {}
        }
    }
    scope
}

fn hash_alg(algorithm: &str) -> String {
    match algorithm {
        "md5" => "MD5".to_string(),
        "sha1" => "SHA-1".to_string(),
        "sha256" => "SHA-256".to_string(),
        "sha384" => "SHA-384".to_string(),
        "sha512" => "SHA-512".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::codec;
    use crate::model::{ArtifactHash, ComponentId, Relationship};
    use std::collections::BTreeSet;

    fn component(name: &str, version: &str, roles: &[Role]) -> Component {
        Component {
            id: ComponentId::purl(name, version),
            name: name.to_string(),
            version: version.to_string(),
            roles: roles.iter().cloned().collect::<BTreeSet<_>>(),
            authors: Vec::new(),
            license: None,
            description: None,
            homepage: None,
            hashes: Vec::new(),
        }
    }

    fn document() -> IntermediateDocument {
        IntermediateDocument {
            subject: component("app", "1.0", &[]),
            components: vec![
                component("lib", "2.1", &[Role::Direct]),
                component("testtool", "0.3", &[Role::Dev]),
            ],
            relationships: vec![
                Relationship {
                    parent: ComponentId::purl("app", "1.0"),
                    child: ComponentId::purl("lib", "2.1"),
                    group: "default".to_string(),
                },
                Relationship {
                    parent: ComponentId::purl("lib", "2.1"),
                    child: ComponentId::purl("testtool", "0.3"),
                    group: "dev".to_string(),
                },
            ],
            timestamp: chrono::Utc::now(),
            serial_number: uuid::Uuid::new_v4(),
        }
    }

    fn export_json(version: SpecVersion) -> serde_json::Value {
        let tree = CycloneDxDriver
            .export(&document(), version, Syntax::Json)
            .unwrap();
        let bytes = codec::encode(&tree, Syntax::Json).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_json_1_4_shape() {
        let value = export_json(SpecVersion::new(1, 4));

        assert_eq!(value["bomFormat"], "CycloneDX");
        assert_eq!(value["specVersion"], "1.4");
        assert_eq!(value["metadata"]["component"]["name"], "app");
        assert_eq!(value["components"].as_array().unwrap().len(), 2);

        // root and each of the two components get a dependency entry
        let dependencies = value["dependencies"].as_array().unwrap();
        assert_eq!(dependencies.len(), 3);
        let root_entry = dependencies
            .iter()
            .find(|d| d["ref"] == "pkg:pypi/app@1.0")
            .unwrap();
        assert_eq!(root_entry["dependsOn"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_scope_mapping() {
        let value = export_json(SpecVersion::new(1, 4));
        let components = value["components"].as_array().unwrap();

        let lib = components.iter().find(|c| c["name"] == "lib").unwrap();
        assert_eq!(lib["scope"], "required");
        let testtool = components.iter().find(|c| c["name"] == "testtool").unwrap();
        assert_eq!(testtool["scope"], "excluded");
    }

    #[test]
    fn test_scope_required_beats_optional_and_dev() {
        let c = component(
            "x",
            "1",
            &[Role::Dev, Role::Optional("cli".to_string()), Role::Transitive],
        );
        assert_eq!(scope_of(&c), "required");

        let c = component("x", "1", &[Role::Dev, Role::Optional("cli".to_string())]);
        assert_eq!(scope_of(&c), "optional");
    }

    #[test]
    fn test_metadata_absent_before_1_2() {
        let tree = CycloneDxDriver
            .export(&document(), SpecVersion::new(1, 1), Syntax::Xml)
            .unwrap();
        let text = String::from_utf8(codec::encode(&tree, Syntax::Xml).unwrap()).unwrap();

        assert!(text.contains("http://cyclonedx.org/schema/bom/1.1"));
        assert!(!text.contains("<metadata>"));
        assert!(!text.contains("<dependencies>"));
    }

    #[test]
    fn test_json_rejected_below_1_2() {
        assert_eq!(
            CycloneDxDriver.supported_syntaxes(SpecVersion::new(1, 1)),
            &[Syntax::Xml]
        );
        assert!(CycloneDxDriver
            .supported_syntaxes(SpecVersion::new(1, 2))
            .contains(&Syntax::Json));
    }

    #[test]
    fn test_hashes_rendered_with_mapped_algorithm() {
        let mut doc = document();
        doc.components[0].hashes.push(ArtifactHash {
            file: "lib-2.1-py3-none-any.whl".to_string(),
            algorithm: "sha256".to_string(),
            value: "abc123".to_string(),
        });

        let tree = CycloneDxDriver
            .export(&doc, SpecVersion::new(1, 4), Syntax::Json)
            .unwrap();
        let bytes = codec::encode(&tree, Syntax::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let lib = value["components"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == "lib")
            .unwrap();
        assert_eq!(lib["hashes"][0]["alg"], "SHA-256");
        assert_eq!(lib["hashes"][0]["content"], "abc123");
    }

    #[test]
    fn test_license_name_only_below_1_2() {
        let mut doc = document();
        doc.components[0].license = Some("MIT".to_string());

        let tree = CycloneDxDriver
            .export(&doc, SpecVersion::new(1, 1), Syntax::Xml)
            .unwrap();
        let text = String::from_utf8(codec::encode(&tree, Syntax::Xml).unwrap()).unwrap();
        assert!(text.contains("<license>"));
        assert!(text.contains("<name>MIT</name>"));
        assert!(!text.contains("<expression>"));
    }
}
