use super::codec::Syntax;
use super::driver::{FormatDriver, SchemaFamily, SpecVersion};
use super::tree::{Node, SerializableDocument};
use crate::model::{Component, IntermediateDocument, TOOL_NAME, TOOL_VERSION};
use crate::shared::Result;
use chrono::SecondsFormat;
use uuid::Uuid;

const VERSIONS: &[SpecVersion] = &[
    SpecVersion::new(1, 0),
    SpecVersion::new(1, 1),
    SpecVersion::new(1, 2),
    SpecVersion::new(2, 0),
    SpecVersion::new(2, 1),
    SpecVersion::new(2, 2),
    SpecVersion::new(2, 3),
];

const NOASSERTION: &str = "NOASSERTION";

/// SPDX 1.0 - 2.3.
///
/// Tag-value and RDF/XML exist for every version; the JSON, YAML and XML
/// bindings arrived with 2.2. Relationships exist from 2.0 (1.x
/// documents are a flat package list); the `DEV_DEPENDENCY_OF` and
/// `OPTIONAL_DEPENDENCY_OF` vocabulary from 2.1, with 2.0 downgrading
/// both to the generic `DEPENDENCY_OF`. purl external references from
/// 2.1, `primaryPackagePurpose` from 2.3. License slots are mandatory
/// below 2.3 and filled with `NOASSERTION` when unknown.
pub struct SpdxDriver;

impl FormatDriver for SpdxDriver {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::Spdx
    }

    fn supported_versions(&self) -> &'static [SpecVersion] {
        VERSIONS
    }

    fn supported_syntaxes(&self, version: SpecVersion) -> &'static [Syntax] {
        if version.at_least(2, 2) {
            &[
                Syntax::TagValue,
                Syntax::Json,
                Syntax::Yaml,
                Syntax::Xml,
                Syntax::RdfXml,
            ]
        } else {
            &[Syntax::TagValue, Syntax::RdfXml]
        }
    }

    fn export(
        &self,
        document: &IntermediateDocument,
        version: SpecVersion,
        syntax: Syntax,
    ) -> Result<SerializableDocument> {
        let tree = match syntax {
            Syntax::TagValue => self.map_tag_value(document, version),
            Syntax::RdfXml => self.map_rdf(document, version),
            _ => self.map_json(document, version),
        };
        Ok(tree)
    }
}

fn spdx_version_string(version: SpecVersion) -> String {
    format!("SPDX-{}", version)
}

fn document_name(document: &IntermediateDocument) -> String {
    format!("{}-{}", document.subject.name, document.subject.version)
}

fn document_namespace(document: &IntermediateDocument) -> String {
    format!(
        "https://spdx.org/spdxdocs/{}-{}",
        document_name(document),
        document.serial_number
    )
}

/// Stable element reference derived from the component's purl
fn package_ref(component: &Component) -> String {
    format!(
        "SPDXRef-Package-{}",
        Uuid::new_v5(&Uuid::NAMESPACE_URL, component.id.as_str().as_bytes())
    )
}

fn creator() -> String {
    format!("Tool: {}-{}", TOOL_NAME, TOOL_VERSION)
}

/// Relationship vocabulary for one edge group. 2.0 knows only the
/// generic form; the specific forms arrive with 2.1.
fn relationship_type(group: &str, version: SpecVersion) -> &'static str {
    if !version.at_least(2, 1) {
        return "DEPENDENCY_OF";
    }
    match group {
        "dev" => "DEV_DEPENDENCY_OF",
        "default" => "DEPENDENCY_OF",
        _ => "OPTIONAL_DEPENDENCY_OF",
    }
}

/// License slot value: mandatory (with sentinel) below 2.3, optional
/// from 2.3 on
fn license_slot(component: &Component, version: SpecVersion) -> Option<String> {
    match (&component.license, version.at_least(2, 3)) {
        (Some(license), _) => Some(license.clone()),
        (None, false) => Some(NOASSERTION.to_string()),
        (None, true) => None,
    }
}

fn checksum_algorithm(algorithm: &str) -> String {
    algorithm.to_ascii_uppercase().replace('-', "")
}

fn primary_purpose(component: &Component) -> &'static str {
    if component.roles.is_empty() {
        "APPLICATION"
    } else {
        "LIBRARY"
    }
}

impl SpdxDriver {
    fn map_json(&self, document: &IntermediateDocument, version: SpecVersion) -> SerializableDocument {
        let mut root = Node::object();
        root.push("spdxVersion", Node::str(spdx_version_string(version)));
        root.push("dataLicense", Node::str("CC0-1.0"));
        root.push("SPDXID", Node::str("SPDXRef-DOCUMENT"));
        root.push("name", Node::str(document_name(document)));
        root.push("documentNamespace", Node::str(document_namespace(document)));

        let mut creation = Node::object();
        creation.push(
            "created",
            Node::str(
                document
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        );
        creation.push("creators", Node::Array(vec![Node::str(creator())]));
        root.push("creationInfo", creation);

        let packages = std::iter::once(&document.subject)
            .chain(document.components.iter())
            .map(|c| self.json_package(c, version))
            .collect();
        root.push("packages", Node::Array(packages));

        root.push(
            "documentDescribes",
            Node::Array(vec![Node::str(package_ref(&document.subject))]),
        );

        if version.at_least(2, 0) {
            root.push("relationships", self.json_relationships(document, version));
        }

        SerializableDocument::new("Document", root)
    }

    fn json_package(&self, component: &Component, version: SpecVersion) -> Node {
        let mut node = Node::object();
        node.push("name", Node::str(&component.name));
        node.push("SPDXID", Node::str(package_ref(component)));
        node.push("versionInfo", Node::str(&component.version));
        node.push("downloadLocation", Node::str(NOASSERTION));

        let license = license_slot(component, version);
        node.push_opt("licenseConcluded", license.as_deref().map(Node::str));
        node.push_opt("licenseDeclared", license.as_deref().map(Node::str));
        if !version.at_least(2, 3) {
            node.push("copyrightText", Node::str(NOASSERTION));
        }

        if let Some(author) = component.authors.first() {
            node.push("originator", Node::str(format!("Person: {}", author)));
        }
        node.push_opt(
            "description",
            component.description.as_deref().map(Node::str),
        );
        node.push_opt("homepage", component.homepage.as_deref().map(Node::str));

        if !component.hashes.is_empty() {
            node.push(
                "checksums",
                Node::Array(
                    component
                        .hashes
                        .iter()
                        .map(|h| {
                            Node::Map(vec![
                                (
                                    "algorithm".to_string(),
                                    Node::str(checksum_algorithm(&h.algorithm)),
                                ),
                                ("checksumValue".to_string(), Node::str(&h.value)),
                            ])
                        })
                        .collect(),
                ),
            );
        }

        if version.at_least(2, 1) {
            node.push(
                "externalRefs",
                Node::Array(vec![Node::Map(vec![
                    (
                        "referenceCategory".to_string(),
                        Node::str("PACKAGE-MANAGER"),
                    ),
                    ("referenceType".to_string(), Node::str("purl")),
                    (
                        "referenceLocator".to_string(),
                        Node::str(component.id.as_str()),
                    ),
                ])]),
            );
        }

        if version.at_least(2, 3) {
            node.push("primaryPackagePurpose", Node::str(primary_purpose(component)));
        }

        node
    }

    fn json_relationships(&self, document: &IntermediateDocument, version: SpecVersion) -> Node {
        let mut entries = vec![Node::Map(vec![
            ("spdxElementId".to_string(), Node::str("SPDXRef-DOCUMENT")),
            ("relationshipType".to_string(), Node::str("DESCRIBES")),
            (
                "relatedSpdxElement".to_string(),
                Node::str(package_ref(&document.subject)),
            ),
        ])];

        for relationship in &document.relationships {
            let parent = document.component(&relationship.parent);
            let child = document.component(&relationship.child);
            if let (Some(parent), Some(child)) = (parent, child) {
                entries.push(Node::Map(vec![
                    (
                        "spdxElementId".to_string(),
                        Node::str(package_ref(child)),
                    ),
                    (
                        "relationshipType".to_string(),
                        Node::str(relationship_type(&relationship.group, version)),
                    ),
                    (
                        "relatedSpdxElement".to_string(),
                        Node::str(package_ref(parent)),
                    ),
                ]));
            }
        }
        Node::Array(entries)
    }

    fn map_tag_value(&self, document: &IntermediateDocument, version: SpecVersion) -> SerializableDocument {
        let mut sections = Vec::new();

        let mut header = Node::object();
        header.push("SPDXVersion", Node::str(spdx_version_string(version)));
        header.push("DataLicense", Node::str("CC0-1.0"));
        if version.at_least(2, 0) {
            header.push("SPDXID", Node::str("SPDXRef-DOCUMENT"));
        }
        header.push("DocumentName", Node::str(document_name(document)));
        if version.at_least(2, 0) {
            header.push("DocumentNamespace", Node::str(document_namespace(document)));
        }
        header.push("Creator", Node::str(creator()));
        header.push(
            "Created",
            Node::str(
                document
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        );
        sections.push(header);

        for component in
            std::iter::once(&document.subject).chain(document.components.iter())
        {
            sections.push(self.tag_value_package(component, version));
        }

        if version.at_least(2, 0) {
            let mut lines = vec![Node::str(format!(
                "SPDXRef-DOCUMENT DESCRIBES {}",
                package_ref(&document.subject)
            ))];
            for relationship in &document.relationships {
                let parent = document.component(&relationship.parent);
                let child = document.component(&relationship.child);
                if let (Some(parent), Some(child)) = (parent, child) {
                    lines.push(Node::str(format!(
                        "{} {} {}",
                        package_ref(child),
                        relationship_type(&relationship.group, version),
                        package_ref(parent)
                    )));
                }
            }
            sections.push(Node::Map(vec![(
                "Relationship".to_string(),
                Node::Array(lines),
            )]));
        }

        SerializableDocument::new("Document", Node::Array(sections))
    }

    fn tag_value_package(&self, component: &Component, version: SpecVersion) -> Node {
        let mut section = Node::object();
        section.push("PackageName", Node::str(&component.name));
        if version.at_least(2, 0) {
            section.push("SPDXID", Node::str(package_ref(component)));
        }
        section.push("PackageVersion", Node::str(&component.version));
        section.push("PackageDownloadLocation", Node::str(NOASSERTION));

        let license = license_slot(component, version);
        section.push_opt(
            "PackageLicenseConcluded",
            license.as_deref().map(Node::str),
        );
        section.push_opt("PackageLicenseDeclared", license.as_deref().map(Node::str));
        if !version.at_least(2, 3) {
            section.push("PackageCopyrightText", Node::str(NOASSERTION));
        }

        if let Some(author) = component.authors.first() {
            section.push("PackageOriginator", Node::str(format!("Person: {}", author)));
        }
        section.push_opt(
            "PackageDescription",
            component.description.as_deref().map(Node::str),
        );
        section.push_opt(
            "PackageHomePage",
            component.homepage.as_deref().map(Node::str),
        );

        for hash in &component.hashes {
            section.push(
                "PackageChecksum",
                Node::str(format!(
                    "{}: {}",
                    checksum_algorithm(&hash.algorithm),
                    hash.value
                )),
            );
        }

        if version.at_least(2, 1) {
            section.push(
                "ExternalRef",
                Node::str(format!("PACKAGE-MANAGER purl {}", component.id)),
            );
        }
        if version.at_least(2, 3) {
            section.push(
                "PrimaryPackagePurpose",
                Node::str(primary_purpose(component)),
            );
        }
        section
    }

    fn map_rdf(&self, document: &IntermediateDocument, version: SpecVersion) -> SerializableDocument {
        let namespace = document_namespace(document);
        let mut root = Node::object();
        root.push(
            "@xmlns:rdf",
            Node::str("http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
        );
        root.push("@xmlns", Node::str("http://spdx.org/rdf/terms#"));

        let mut doc = Node::object();
        doc.push(
            "@rdf:about",
            Node::str(format!("{}#SPDXRef-DOCUMENT", namespace)),
        );
        doc.push("specVersion", Node::str(spdx_version_string(version)));
        doc.push("dataLicense", Node::str("CC0-1.0"));
        doc.push("name", Node::str(document_name(document)));

        let mut creation = Node::object();
        creation.push(
            "created",
            Node::str(
                document
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        );
        creation.push("creator", Node::str(creator()));
        doc.push("creationInfo", Node::Map(vec![("CreationInfo".to_string(), creation)]));
        doc.push(
            "describesPackage",
            Node::Map(vec![(
                "@rdf:resource".to_string(),
                Node::str(format!("{}#{}", namespace, package_ref(&document.subject))),
            )]),
        );
        root.push("SpdxDocument", doc);

        let packages: Vec<Node> = std::iter::once(&document.subject)
            .chain(document.components.iter())
            .map(|component| {
                let mut node = Node::object();
                node.push(
                    "@rdf:about",
                    Node::str(format!("{}#{}", namespace, package_ref(component))),
                );
                node.push("name", Node::str(&component.name));
                node.push("versionInfo", Node::str(&component.version));
                node.push("downloadLocation", Node::str(NOASSERTION));
                let license = license_slot(component, version);
                node.push_opt("licenseConcluded", license.as_deref().map(Node::str));
                node.push_opt("licenseDeclared", license.as_deref().map(Node::str));
                node.push_opt(
                    "description",
                    component.description.as_deref().map(Node::str),
                );
                node
            })
            .collect();
        root.push("Package", Node::Array(packages));

        if version.at_least(2, 0) {
            let relationships: Vec<Node> = document
                .relationships
                .iter()
                .filter_map(|relationship| {
                    let parent = document.component(&relationship.parent)?;
                    let child = document.component(&relationship.child)?;
                    let mut node = Node::object();
                    node.push(
                        "relationshipType",
                        Node::str(format!(
                            "http://spdx.org/rdf/terms#relationshipType_{}",
                            relationship_type(&relationship.group, version).to_ascii_lowercase()
                        )),
                    );
                    node.push(
                        "spdxElement",
                        Node::Map(vec![(
                            "@rdf:resource".to_string(),
                            Node::str(format!("{}#{}", namespace, package_ref(child))),
                        )]),
                    );
                    node.push(
                        "relatedSpdxElement",
                        Node::Map(vec![(
                            "@rdf:resource".to_string(),
                            Node::str(format!("{}#{}", namespace, package_ref(parent))),
                        )]),
                    );
                    Some(node)
                })
                .collect();
            root.push("Relationship", Node::Array(relationships));
        }

        SerializableDocument::new("rdf:RDF", root)
    }
}
