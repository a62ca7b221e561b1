//! Node classification.
//!
//! Every node is exactly one of inline, block or container. Classification is
//! derived from the tag and, for elements, from the categories of the
//! children, so it is recomputed on demand rather than cached.

use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Inline,
    Block,
    Container,
}

const INLINE_TAGS: &[&str] = &[
    "A", "ABBR", "ACRONYM", "B", "BDI", "BDO", "BIG", "BR", "BUTTON", "CITE", "CODE", "DATA",
    "DEL", "DFN", "EM", "FONT", "HR", "I", "IFRAME", "IMG", "INPUT", "INS", "KBD", "LABEL",
    "MARK", "OBJECT", "OUTPUT", "Q", "RP", "RT", "RUBY", "S", "SAMP", "SELECT", "SMALL", "SPAN",
    "STRIKE", "STRONG", "SUB", "SUP", "TEXTAREA", "TIME", "TT", "U", "VAR", "VIDEO", "WBR",
];

const VOID_TAGS: &[&str] = &["BR", "HR", "IFRAME", "IMG", "INPUT"];

const BLOCK_TAGS: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "BLOCKQUOTE", "BODY", "DD", "DETAILS", "DIV", "DL", "DT",
    "FIELDSET", "FIGCAPTION", "FIGURE", "FOOTER", "FORM", "H1", "H2", "H3", "H4", "H5", "H6",
    "HEADER", "LI", "MAIN", "NAV", "OL", "P", "PRE", "SECTION", "TABLE", "TBODY", "TD", "TFOOT",
    "TH", "THEAD", "TR", "UL",
];

pub const OPAQUE_ATTR: &str = "contenteditable";

pub fn is_inline_tag(tag: &str) -> bool {
    INLINE_TAGS.contains(&tag)
}

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

pub fn is_list_tag(tag: &str) -> bool {
    matches!(tag, "UL" | "OL")
}

/// Elements the editor must not descend into.
pub fn is_opaque(doc: &Document, id: NodeId) -> bool {
    doc.attr(id, OPAQUE_ATTR) == Some("false")
}

/// Elements that can never hold content: void tags and opaque elements.
pub fn is_void(doc: &Document, id: NodeId) -> bool {
    match doc.tag(id) {
        Some(tag) => VOID_TAGS.contains(&tag) || is_opaque(doc, id),
        None => false,
    }
}

/// An element with no editable children. Text nodes are never leaves.
pub fn is_leaf(doc: &Document, id: NodeId) -> bool {
    doc.is_element(id) && (is_void(doc, id) || doc.first_child(id).is_none())
}

pub fn category(doc: &Document, id: NodeId) -> Category {
    let Some(tag) = doc.tag(id) else {
        return Category::Inline;
    };
    if is_opaque(doc, id) {
        return Category::Inline;
    }
    let children = doc.children(id);
    if children.iter().any(|child| !is_inline(doc, *child)) {
        return Category::Container;
    }
    if is_inline_tag(tag) || (children.is_empty() && !is_block_tag(tag)) {
        Category::Inline
    } else {
        Category::Block
    }
}

pub fn is_inline(doc: &Document, id: NodeId) -> bool {
    category(doc, id) == Category::Inline
}

pub fn is_block(doc: &Document, id: NodeId) -> bool {
    category(doc, id) == Category::Block
}

pub fn is_container(doc: &Document, id: NodeId) -> bool {
    category(doc, id) == Category::Container
}

/// Leaves that render something even without text.
pub fn is_visible_leaf(doc: &Document, id: NodeId) -> bool {
    match doc.tag(id) {
        Some("BR") => false,
        Some("INPUT") => doc.attr(id, "type") != Some("hidden"),
        Some(tag) => matches!(tag, "IMG" | "HR" | "IFRAME") || is_opaque(doc, id),
        None => false,
    }
}

/// Text with at least one char that is neither whitespace nor a placeholder.
pub fn has_visible_text(doc: &Document, id: NodeId) -> bool {
    doc.text(id)
        .is_some_and(|text| text.chars().any(|c| !c.is_whitespace() && c != crate::dom::ZWS))
}

/// True when the block holds no visible text and no visible leaf.
pub fn is_empty_block(doc: &Document, block: NodeId) -> bool {
    !doc.descendants(block)
        .into_iter()
        .skip(1)
        .any(|node| is_visible_leaf(doc, node) || has_visible_text(doc, node))
}
