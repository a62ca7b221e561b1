use crate::category::is_block;
use crate::dom::{Attrs, Document, NodeId};
use crate::error::Result;
use crate::walker::{Show, TreeWalker};

/// Which ends of the ancestor chain an ancestor search may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AncestorScope {
    pub include_self: bool,
    pub include_root: bool,
}

impl AncestorScope {
    pub const STRICT: Self = Self {
        include_self: false,
        include_root: false,
    };
    pub const INCLUSIVE: Self = Self {
        include_self: true,
        include_root: false,
    };
}

pub fn nearest_ancestor(
    doc: &Document,
    node: NodeId,
    root: NodeId,
    scope: AncestorScope,
    pred: impl Fn(&Document, NodeId) -> bool,
) -> Result<Option<NodeId>> {
    doc.ensure_within(node, root)?;
    let mut current = if scope.include_self || node == root {
        Some(node)
    } else {
        doc.parent(node)
    };
    while let Some(candidate) = current {
        if candidate == root {
            return Ok((scope.include_root && pred(doc, candidate)).then_some(candidate));
        }
        if pred(doc, candidate) {
            return Ok(Some(candidate));
        }
        current = doc.parent(candidate);
    }
    Ok(None)
}

/// Exact tag plus, when given, exact attribute values.
pub fn has_tag_attributes(doc: &Document, node: NodeId, tag: &str, attrs: Option<&Attrs>) -> bool {
    if doc.tag(node) != Some(tag) {
        return false;
    }
    attrs.is_none_or(|attrs| {
        attrs
            .iter()
            .all(|(name, value)| doc.attr(node, name) == Some(value.as_str()))
    })
}

/// Nearest inclusive ancestor below `root` with the given tag and attributes.
pub fn nearest_with_tag(
    doc: &Document,
    node: NodeId,
    root: NodeId,
    tag: &str,
    attrs: Option<&Attrs>,
) -> Result<Option<NodeId>> {
    nearest_ancestor(doc, node, root, AncestorScope::INCLUSIVE, |doc, candidate| {
        has_tag_attributes(doc, candidate, tag, attrs)
    })
}

/// True when `node` or an ancestor up to and including `root` has the id.
pub fn has_ancestor_with_id(doc: &Document, node: NodeId, root: NodeId, id: &str) -> Result<bool> {
    let scope = AncestorScope {
        include_self: true,
        include_root: true,
    };
    let found = nearest_ancestor(doc, node, root, scope, |doc, candidate| {
        doc.attr(candidate, "id") == Some(id)
    })?;
    Ok(found.is_some())
}

pub(crate) fn walk_next_block(doc: &Document, node: NodeId, root: NodeId) -> Option<NodeId> {
    let mut walker = TreeWalker::new(doc, root, Show::Elements, is_block);
    walker.set_current(node);
    walker.next_node()
}

pub(crate) fn walk_previous_block(doc: &Document, node: NodeId, root: NodeId) -> Option<NodeId> {
    let mut walker = TreeWalker::new(doc, root, Show::Elements, is_block);
    walker.set_current(node);
    walker.previous_node()
}

/// First block after `node` in document order, descendants included.
pub fn next_block(doc: &Document, node: NodeId, root: NodeId) -> Result<Option<NodeId>> {
    doc.ensure_within(node, root)?;
    Ok(walk_next_block(doc, node, root))
}

/// Nearest block before `node` in document order, ancestors included.
pub fn previous_block(doc: &Document, node: NodeId, root: NodeId) -> Result<Option<NodeId>> {
    doc.ensure_within(node, root)?;
    Ok(walk_previous_block(doc, node, root))
}
