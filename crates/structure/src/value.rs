use serde::{Deserialize, Serialize};

use crate::dom::Attrs;

const DEFAULT_SCHEMA: &str = "manos-structure";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Owned, serializable snapshot of a subtree.
///
/// The arena [`crate::Document`] is built from and exported to this shape, so
/// tests and hosts can describe trees as plain values or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode { text: text.into() })
    }

    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            tag: tag.into().to_ascii_uppercase(),
            attrs: Attrs::default(),
            children,
        })
    }

    pub fn element_with(tag: impl Into<String>, attrs: &[(&str, &str)], children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            tag: tag.into().to_ascii_uppercase(),
            attrs: attrs
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            children,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element("P", vec![Node::text(text)])
    }

    pub fn br() -> Self {
        Node::element("BR", Vec::new())
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element(el) => Some(&el.tag),
            Node::Text(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.text.clone(),
            Node::Element(el) => el.children.iter().map(Node::text_content).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl DocumentValue {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            children,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
