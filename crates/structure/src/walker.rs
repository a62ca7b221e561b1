use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Show {
    Elements,
    Text,
    All,
}

/// Document-order cursor over the subtree of `root`, restricted by node kind
/// and a predicate. The walk never yields `root` itself and never leaves it.
pub struct TreeWalker<'a, F>
where
    F: Fn(&Document, NodeId) -> bool,
{
    doc: &'a Document,
    root: NodeId,
    show: Show,
    filter: F,
    current: NodeId,
}

impl<'a, F> TreeWalker<'a, F>
where
    F: Fn(&Document, NodeId) -> bool,
{
    pub fn new(doc: &'a Document, root: NodeId, show: Show, filter: F) -> Self {
        Self {
            doc,
            root,
            show,
            filter,
            current: root,
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Nodes outside `root` reset the cursor to `root`.
    pub fn set_current(&mut self, node: NodeId) {
        self.current = if self.doc.contains(self.root, node) {
            node
        } else {
            self.root
        };
    }

    fn accepts(&self, node: NodeId) -> bool {
        let shown = match self.show {
            Show::Elements => self.doc.is_element(node),
            Show::Text => self.doc.is_text(node),
            Show::All => true,
        };
        shown && (self.filter)(self.doc, node)
    }

    pub fn next_node(&mut self) -> Option<NodeId> {
        let mut current = self.current;
        loop {
            let mut node = self.doc.first_child(current);
            while node.is_none() {
                if current == self.root {
                    break;
                }
                node = self.doc.next_sibling(current);
                if node.is_none() {
                    current = self.doc.parent(current)?;
                }
            }
            let node = node?;
            if self.accepts(node) {
                self.current = node;
                return Some(node);
            }
            current = node;
        }
    }

    pub fn previous_node(&mut self) -> Option<NodeId> {
        let mut current = self.current;
        loop {
            if current == self.root {
                return None;
            }
            let node = match self.doc.previous_sibling(current) {
                Some(mut node) => {
                    while let Some(last) = self.doc.last_child(node) {
                        node = last;
                    }
                    node
                }
                None => self.doc.parent(current)?,
            };
            if self.accepts(node) && node != self.root {
                self.current = node;
                return Some(node);
            }
            current = node;
        }
    }
}
