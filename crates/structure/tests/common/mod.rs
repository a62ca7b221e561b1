#![allow(dead_code)]

use manos_structure::{Document, Node, NodeId, Point, Range};

/// Routes engine logs to the test output; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// First text node whose content equals `text`.
pub fn text_node(doc: &Document, text: &str) -> NodeId {
    doc.descendants(doc.body())
        .into_iter()
        .find(|node| doc.text(*node) == Some(text))
        .unwrap_or_else(|| panic!("no text node {text:?}"))
}

/// First element with the given tag.
pub fn element(doc: &Document, tag: &str) -> NodeId {
    doc.descendants(doc.body())
        .into_iter()
        .find(|node| doc.has_tag(*node, tag))
        .unwrap_or_else(|| panic!("no {tag} element"))
}

pub fn caret(node: NodeId, offset: usize) -> Range {
    Range::collapsed(Point::new(node, offset))
}

pub fn span(node: NodeId, start: usize, end: usize) -> Range {
    Range::new(Point::new(node, start), Point::new(node, end))
}

pub fn p(children: Vec<Node>) -> Node {
    Node::element("P", children)
}

pub fn li(text: &str) -> Node {
    Node::element("LI", vec![Node::text(text)])
}

pub fn ul(items: Vec<Node>) -> Node {
    Node::element("UL", items)
}
