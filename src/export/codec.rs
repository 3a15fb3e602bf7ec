use super::tree::{Node, SerializableDocument};
use crate::shared::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// The concrete serialization syntaxes the codecs can render.
///
/// `JsonLd` and `RdfXml` reuse the JSON and XML encoders; they are
/// distinct values because drivers advertise them separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Json,
    Yaml,
    Xml,
    RdfXml,
    TagValue,
    JsonLd,
}

impl Syntax {
    pub fn label(&self) -> &'static str {
        match self {
            Syntax::Json => "json",
            Syntax::Yaml => "yaml",
            Syntax::Xml => "xml",
            Syntax::RdfXml => "rdf-xml",
            Syntax::TagValue => "tag-value",
            Syntax::JsonLd => "json-ld",
        }
    }

    /// File extension conventionally used for the syntax
    pub fn extension(&self) -> &'static str {
        match self {
            Syntax::Json => "json",
            Syntax::Yaml => "yaml",
            Syntax::Xml => "xml",
            Syntax::RdfXml => "rdf.xml",
            Syntax::TagValue => "spdx",
            Syntax::JsonLd => "jsonld",
        }
    }
}

impl std::fmt::Display for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Syntax::Json),
            "yaml" | "yml" => Ok(Syntax::Yaml),
            "xml" => Ok(Syntax::Xml),
            "rdf-xml" | "rdf" => Ok(Syntax::RdfXml),
            "tag-value" | "tag" => Ok(Syntax::TagValue),
            "json-ld" | "jsonld" => Ok(Syntax::JsonLd),
            other => Err(format!(
                "unknown syntax '{}' (expected one of: json, yaml, xml, rdf-xml, tag-value, json-ld)",
                other
            )),
        }
    }
}

/// Renders a mapped document to bytes in the requested syntax.
///
/// Drivers have already shaped the tree for the syntax, so encoding is
/// purely mechanical here.
pub fn encode(document: &SerializableDocument, syntax: Syntax) -> Result<Vec<u8>> {
    match syntax {
        Syntax::Json | Syntax::JsonLd => {
            let mut bytes = serde_json::to_vec_pretty(&document.root)?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        Syntax::Yaml => Ok(serde_yaml_ng::to_string(&document.root)?.into_bytes()),
        Syntax::Xml | Syntax::RdfXml => encode_xml(document),
        Syntax::TagValue => Ok(encode_tag_value(&document.root).into_bytes()),
    }
}

fn encode_xml(document: &SerializableDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, &document.root_name, &document.root)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes one element. Array values repeat the element name per item;
/// map keys starting with `@` become attributes and `#text` becomes the
/// element's text content.
fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, node: &Node) -> Result<()> {
    match node {
        Node::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        Node::Map(entries) => {
            let mut start = BytesStart::new(name);
            let mut text: Option<String> = None;
            let mut children: Vec<(&str, &Node)> = Vec::new();
            for (key, value) in entries {
                if let Some(attribute) = key.strip_prefix('@') {
                    if let Some(scalar) = value.scalar_text() {
                        start.push_attribute((attribute, scalar.as_str()));
                    }
                } else if key == "#text" {
                    text = value.scalar_text();
                } else {
                    children.push((key, value));
                }
            }

            if children.is_empty() && text.is_none() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }

            writer.write_event(Event::Start(start))?;
            if let Some(text) = text {
                writer.write_event(Event::Text(BytesText::new(&text)))?;
            }
            for (key, value) in children {
                write_element(writer, key, value)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        scalar => {
            let text = scalar.scalar_text().unwrap_or_default();
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

/// Renders the flat tag-value form: the root is an array of sections,
/// each section a map of `Tag: value` lines, sections separated by a
/// blank line. Multi-line values are wrapped in `<text>` markers.
fn encode_tag_value(root: &Node) -> String {
    let sections: Vec<&Node> = match root {
        Node::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut output = String::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        if let Node::Map(entries) = section {
            for (tag, value) in entries {
                match value {
                    Node::Array(items) => {
                        for item in items {
                            if let Some(scalar) = item.scalar_text() {
                                push_tag_line(&mut output, tag, &scalar);
                            }
                        }
                    }
                    other => {
                        if let Some(scalar) = other.scalar_text() {
                            push_tag_line(&mut output, tag, &scalar);
                        }
                    }
                }
            }
        }
    }
    output
}

fn push_tag_line(output: &mut String, tag: &str, value: &str) {
    if value.contains('\n') {
        output.push_str(&format!("{}: <text>{}</text>\n", tag, value));
    } else {
        output.push_str(&format!("{}: {}\n", tag, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SerializableDocument {
        let mut root = Node::object();
        root.push("@version", Node::str("1"));
        root.push("name", Node::str("demo"));
        root.push(
            "items",
            Node::Map(vec![(
                "item".to_string(),
                Node::Array(vec![Node::str("a"), Node::str("b")]),
            )]),
        );
        SerializableDocument::new("doc", root)
    }

    #[test]
    fn test_encode_json() {
        let mut root = Node::object();
        root.push("name", Node::str("demo"));
        let document = SerializableDocument::new("doc", root);

        let bytes = encode(&document, Syntax::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["name"], "demo");
    }

    #[test]
    fn test_encode_xml_attributes_and_repetition() {
        let bytes = encode(&sample(), Syntax::Xml).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<doc version=\"1\">"));
        assert!(text.contains("<item>a</item>"));
        assert!(text.contains("<item>b</item>"));
        assert!(text.contains("</doc>"));
    }

    #[test]
    fn test_encode_xml_escapes_text() {
        let mut root = Node::object();
        root.push("name", Node::str("a < b & c"));
        let document = SerializableDocument::new("doc", root);

        let text = String::from_utf8(encode(&document, Syntax::Xml).unwrap()).unwrap();
        assert!(text.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_encode_tag_value_sections() {
        let root = Node::Array(vec![
            Node::Map(vec![
                ("SPDXVersion".to_string(), Node::str("SPDX-2.3")),
                ("DocumentName".to_string(), Node::str("demo")),
            ]),
            Node::Map(vec![("PackageName".to_string(), Node::str("lib"))]),
        ]);
        let document = SerializableDocument::new("doc", root);

        let text = String::from_utf8(encode(&document, Syntax::TagValue).unwrap()).unwrap();
        assert_eq!(
            text,
            "SPDXVersion: SPDX-2.3\nDocumentName: demo\n\nPackageName: lib\n"
        );
    }

    #[test]
    fn test_encode_tag_value_wraps_multiline() {
        let root = Node::Map(vec![(
            "PackageDescription".to_string(),
            Node::str("line one\nline two"),
        )]);
        let document = SerializableDocument::new("doc", root);

        let text = String::from_utf8(encode(&document, Syntax::TagValue).unwrap()).unwrap();
        assert!(text.contains("<text>line one\nline two</text>"));
    }

    #[test]
    fn test_encode_yaml() {
        let mut root = Node::object();
        root.push("name", Node::str("demo"));
        let document = SerializableDocument::new("doc", root);

        let text = String::from_utf8(encode(&document, Syntax::Yaml).unwrap()).unwrap();
        assert!(text.contains("name: demo"));
    }
}
