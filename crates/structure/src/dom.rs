use indexmap::IndexMap;
use indextree::Arena;
pub use indextree::NodeId;

use crate::error::{EditError, Result};
use crate::value::{DocumentValue, ElementNode, Node, TextNode};

pub type Attrs = IndexMap<String, String>;

/// Zero-width space, used as a caret placeholder inside otherwise empty inlines.
pub const ZWS: char = '\u{200B}';

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Attrs,
}

impl ElementData {
    pub fn new(tag: &str, attrs: Attrs) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            attrs,
        }
    }
}

/// Arena-backed document tree.
///
/// Node ids stay valid across moves, so a point anchored inside a subtree
/// survives when that subtree is re-parented. Offsets inside text nodes count
/// chars; offsets inside elements count children.
#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<NodeData>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let body = arena.new_node(NodeData::Element(ElementData::new("BODY", Attrs::new())));
        Self { arena, body }
    }

    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut doc = Self::new();
        for node in nodes {
            let id = doc.build(node);
            doc.body.append(id, &mut doc.arena);
        }
        doc
    }

    pub fn from_value(value: &DocumentValue) -> Self {
        Self::from_nodes(&value.children)
    }

    pub fn to_value(&self) -> DocumentValue {
        DocumentValue::new(self.children_to_nodes(self.body))
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn build(&mut self, node: &Node) -> NodeId {
        match node {
            Node::Text(text) => self.create_text(text.text.clone()),
            Node::Element(el) => {
                let id = self.create_element(&el.tag, el.attrs.clone());
                for child in &el.children {
                    let child = self.build(child);
                    id.append(child, &mut self.arena);
                }
                id
            }
        }
    }

    pub fn to_node(&self, id: NodeId) -> Node {
        match self.data(id) {
            NodeData::Text(text) => Node::Text(TextNode { text: text.clone() }),
            NodeData::Element(el) => Node::Element(ElementNode {
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                children: self.children_to_nodes(id),
            }),
        }
    }

    pub fn children_to_nodes(&self, id: NodeId) -> Vec<Node> {
        id.children(&self.arena).map(|child| self.to_node(child)).collect()
    }

    // Queries.

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|node| !node.is_removed())
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        self.arena[id].get()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Element(_))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    pub fn attrs(&self, id: NodeId) -> Option<&Attrs> {
        self.element(id).map(|el| &el.attrs)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        id.descendants(&self.arena)
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Char count for text, child count for elements.
    pub fn length(&self, id: NodeId) -> usize {
        match self.data(id) {
            NodeData::Text(text) => text.chars().count(),
            NodeData::Element(_) => self.child_count(id),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].last_child()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].previous_sibling()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.arena).collect()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        id.children(&self.arena).count()
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        id.children(&self.arena).nth(index)
    }

    pub fn index_of(&self, id: NodeId) -> usize {
        id.preceding_siblings(&self.arena).count() - 1
    }

    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        id.descendants(&self.arena).collect()
    }

    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        id.ancestors(&self.arena).collect()
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node.ancestors(&self.arena).any(|id| id == ancestor)
    }

    /// Child indexes from the top-most ancestor down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = id
            .ancestors(&self.arena)
            .filter(|node| self.parent(*node).is_some())
            .map(|node| self.index_of(node))
            .collect();
        path.reverse();
        path
    }

    pub fn ensure_alive(&self, id: NodeId) -> Result<()> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(EditError::RemovedNode(id))
        }
    }

    pub fn ensure_within(&self, node: NodeId, root: NodeId) -> Result<()> {
        self.ensure_alive(root)?;
        self.ensure_alive(node)?;
        if self.contains(root, node) {
            Ok(())
        } else {
            Err(EditError::NodeOutsideRoot { node, root })
        }
    }

    // Construction.

    pub fn create_element(&mut self, tag: &str, attrs: Attrs) -> NodeId {
        self.arena
            .new_node(NodeData::Element(ElementData::new(tag, attrs)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeData::Text(text.into()))
    }

    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let data = self.data(id).clone();
        self.arena.new_node(data)
    }

    // Structural mutation. Inserting an attached node moves it.

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if !self.is_element(parent) {
            return Err(EditError::NotAnElement(parent));
        }
        if self.contains(child, parent) {
            return Err(EditError::InvalidSplit("cannot move a node into its own subtree"));
        }
        if reference == Some(child) {
            return Ok(());
        }
        child.detach(&mut self.arena);
        let moved = match reference {
            Some(reference) => reference.checked_insert_before(child, &mut self.arena),
            None => parent.checked_append(child, &mut self.arena),
        };
        moved.map_err(|_| EditError::InvalidSplit("cannot move a node into its own subtree"))
    }

    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        let reference = self.child_at(parent, index);
        self.insert_before(parent, child, reference)
    }

    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    pub fn remove(&mut self, id: NodeId) {
        id.remove_subtree(&mut self.arena);
    }

    pub fn replace_with(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self.parent(old).ok_or(EditError::Detached(old))?;
        self.insert_before(parent, new, Some(old))?;
        self.detach(old);
        Ok(())
    }

    pub fn empty(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.children(id);
        for child in &children {
            self.detach(*child);
        }
        children
    }

    pub fn append_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for child in children {
            self.append_child(parent, *child)?;
        }
        Ok(())
    }

    pub fn unwrap_element(&mut self, id: NodeId) -> Result<()> {
        let parent = self.parent(id).ok_or(EditError::Detached(id))?;
        for child in self.empty(id) {
            self.insert_before(parent, child, Some(id))?;
        }
        self.remove(id);
        Ok(())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<()> {
        match self.arena[id].get_mut() {
            NodeData::Element(el) => {
                el.attrs.insert(name.to_string(), value.into());
                Ok(())
            }
            NodeData::Text(_) => Err(EditError::NotAnElement(id)),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>> {
        match self.arena[id].get_mut() {
            NodeData::Element(el) => Ok(el.attrs.shift_remove(name)),
            NodeData::Text(_) => Err(EditError::NotAnElement(id)),
        }
    }

    pub fn set_element(&mut self, id: NodeId, tag: &str, attrs: Attrs) -> Result<()> {
        match self.arena[id].get_mut() {
            NodeData::Element(el) => {
                *el = ElementData::new(tag, attrs);
                Ok(())
            }
            NodeData::Text(_) => Err(EditError::NotAnElement(id)),
        }
    }

    // Text mutation.

    fn text_mut(&mut self, id: NodeId) -> Result<&mut String> {
        match self.arena[id].get_mut() {
            NodeData::Text(text) => Ok(text),
            NodeData::Element(_) => Err(EditError::NotAText(id)),
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        *self.text_mut(id)? = text.into();
        Ok(())
    }

    pub fn append_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.text_mut(id)?.push_str(text);
        Ok(())
    }

    pub fn insert_text(&mut self, id: NodeId, offset: usize, text: &str) -> Result<()> {
        let data = self.text_mut(id)?;
        let length = data.chars().count();
        if offset > length {
            return Err(EditError::OffsetOutOfBounds { offset, length });
        }
        let at = byte_index(data, offset);
        data.insert_str(at, text);
        Ok(())
    }

    pub fn delete_text(&mut self, id: NodeId, offset: usize, count: usize) -> Result<()> {
        let data = self.text_mut(id)?;
        let length = data.chars().count();
        if offset + count > length {
            return Err(EditError::OffsetOutOfBounds {
                offset: offset + count,
                length,
            });
        }
        let start = byte_index(data, offset);
        let end = byte_index(data, offset + count);
        data.replace_range(start..end, "");
        Ok(())
    }

    pub fn substring(&self, id: NodeId, start: usize, end: usize) -> Result<String> {
        let data = self.text(id).ok_or(EditError::NotAText(id))?;
        Ok(data.chars().skip(start).take(end.saturating_sub(start)).collect())
    }

    /// Splits a text node at `offset`; the tail becomes the next sibling.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId> {
        let data = self.text_mut(id)?;
        let length = data.chars().count();
        if offset > length {
            return Err(EditError::OffsetOutOfBounds { offset, length });
        }
        let tail = data.split_off(byte_index(data, offset));
        let after = self.create_text(tail);
        if self.parent(id).is_some() {
            id.checked_insert_after(after, &mut self.arena)
                .map_err(|_| EditError::Detached(id))?;
        }
        Ok(after)
    }
}

fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(ix, _)| ix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_text_keeps_identity_of_the_head() {
        let mut doc = Document::from_nodes(&[Node::paragraph("héllo")]);
        let p = doc.first_child(doc.body()).unwrap();
        let text = doc.first_child(p).unwrap();
        let tail = doc.split_text(text, 2).unwrap();
        assert_eq!(doc.text(text), Some("hé"));
        assert_eq!(doc.text(tail), Some("llo"));
        assert_eq!(doc.next_sibling(text), Some(tail));
    }

    #[test]
    fn moving_a_node_into_itself_is_rejected() {
        let mut doc = Document::from_nodes(&[Node::paragraph("a")]);
        let p = doc.first_child(doc.body()).unwrap();
        let text = doc.first_child(p).unwrap();
        assert!(doc.append_child(text, p).is_err());
        assert!(doc.append_child(p, doc.body()).is_err());
    }

    #[test]
    fn path_counts_from_the_top() {
        let doc = Document::from_nodes(&[Node::paragraph("a"), Node::paragraph("b")]);
        let second = doc.child_at(doc.body(), 1).unwrap();
        let text = doc.first_child(second).unwrap();
        assert_eq!(doc.path(text), vec![1, 0]);
        assert_eq!(doc.path(doc.body()), Vec::<usize>::new());
    }
}
