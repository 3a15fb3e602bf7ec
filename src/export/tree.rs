use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// One node of the format-neutral output tree.
///
/// Maps keep insertion order, so drivers control field ordering and the
/// codecs never reshuffle it. The XML codec gives two key spellings a
/// special meaning: keys starting with `@` become attributes and `#text`
/// becomes element text content; the other codecs must never be handed
/// such keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Bool(bool),
    Int(i64),
    Str(String),
    Array(Vec<Node>),
    Map(Vec<(String, Node)>),
}

impl Node {
    pub fn str(value: impl Into<String>) -> Self {
        Node::Str(value.into())
    }

    pub fn object() -> Self {
        Node::Map(Vec::new())
    }

    /// Appends an entry. Only meaningful on `Map` nodes.
    pub fn push(&mut self, key: &str, value: Node) {
        if let Node::Map(entries) = self {
            entries.push((key.to_string(), value));
        } else {
            debug_assert!(false, "push on non-map node");
        }
    }

    /// Appends an entry when the value is present
    pub fn push_opt(&mut self, key: &str, value: Option<Node>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// The text rendering of a scalar node, `None` for arrays and maps
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Node::Bool(b) => Some(b.to_string()),
            Node::Int(i) => Some(i.to_string()),
            Node::Str(s) => Some(s.clone()),
            Node::Array(_) | Node::Map(_) => None,
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Int(i) => serializer.serialize_i64(*i),
            Node::Str(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// A mapped document ready for syntax encoding.
///
/// `root_name` names the document element for the XML syntaxes; the text
/// syntaxes serialize `root` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializableDocument {
    pub root_name: String,
    pub root: Node,
}

impl SerializableDocument {
    pub fn new(root_name: impl Into<String>, root: Node) -> Self {
        Self {
            root_name: root_name.into(),
            root,
        }
    }
}
