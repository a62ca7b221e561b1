use std::cmp::Ordering;

use crate::dom::{Document, NodeId};
use crate::error::{EditError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub node: NodeId,
    pub offset: usize,
}

impl Point {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// An ordered pair of points. `start` never comes after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn collapse_to_start(self) -> Self {
        Self::collapsed(self.start)
    }

    pub fn collapse_to_end(self) -> Self {
        Self::collapsed(self.end)
    }
}

fn point_key(doc: &Document, point: Point) -> Vec<usize> {
    let mut key = doc.path(point.node);
    key.push(point.offset);
    key
}

pub fn compare_points(doc: &Document, a: Point, b: Point) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    point_key(doc, a).cmp(&point_key(doc, b))
}

impl Document {
    pub fn validate_point(&self, point: Point, root: NodeId) -> Result<()> {
        self.ensure_within(point.node, root)?;
        let length = self.length(point.node);
        if point.offset > length {
            return Err(EditError::OffsetOutOfBounds {
                offset: point.offset,
                length,
            });
        }
        Ok(())
    }

    pub fn validate_range(&self, range: &Range, root: NodeId) -> Result<()> {
        self.validate_point(range.start, root)?;
        self.validate_point(range.end, root)?;
        if compare_points(self, range.start, range.end) == Ordering::Greater {
            return Err(EditError::InvertedRange);
        }
        Ok(())
    }
}

pub fn common_ancestor(doc: &Document, range: &Range) -> NodeId {
    let starts = doc.ancestors(range.start.node);
    doc.ancestors(range.end.node)
        .into_iter()
        .find(|node| starts.contains(node))
        .unwrap_or(range.start.node)
}

/// Range test used by every format and structure operation.
///
/// With `partial` the node counts when any part of it overlaps the range;
/// touching at a single boundary is not overlap. Without `partial` the node's
/// whole content must lie between the endpoints.
pub fn is_node_contained_in_range(doc: &Document, range: &Range, node: NodeId, partial: bool) -> bool {
    if partial {
        let Some(parent) = doc.parent(node) else {
            return true;
        };
        let index = doc.index_of(node);
        let node_start = Point::new(parent, index);
        let node_end = Point::new(parent, index + 1);
        compare_points(doc, node_end, range.start) == Ordering::Greater
            && compare_points(doc, node_start, range.end) == Ordering::Less
    } else {
        let node_start = Point::new(node, 0);
        let node_end = Point::new(node, doc.length(node));
        compare_points(doc, range.start, node_start) != Ordering::Greater
            && compare_points(doc, node_end, range.end) != Ordering::Greater
    }
}

/// Deepest node ending right before the point, or the point's node itself.
pub fn node_before_offset(doc: &Document, node: NodeId, offset: usize) -> NodeId {
    let mut node = node;
    let mut offset = offset;
    while offset > 0 && doc.is_element(node) {
        let Some(child) = doc.child_at(node, offset - 1) else {
            break;
        };
        node = child;
        offset = doc.child_count(node);
    }
    node
}

/// Node starting right at the point, climbing out of `node` when the point
/// sits at its end. Never leaves `root`.
pub fn node_after_offset(doc: &Document, node: NodeId, offset: usize, root: NodeId) -> Option<NodeId> {
    if !doc.is_element(node) {
        return Some(node);
    }
    if let Some(child) = doc.child_at(node, offset) {
        return Some(child);
    }
    let mut node = node;
    loop {
        if node == root {
            return None;
        }
        if let Some(next) = doc.next_sibling(node) {
            return Some(next);
        }
        node = doc.parent(node)?;
    }
}

pub fn point_before(doc: &Document, node: NodeId) -> Result<Point> {
    let parent = doc.parent(node).ok_or(EditError::Detached(node))?;
    Ok(Point::new(parent, doc.index_of(node)))
}

pub fn point_after(doc: &Document, node: NodeId) -> Result<Point> {
    let parent = doc.parent(node).ok_or(EditError::Detached(node))?;
    Ok(Point::new(parent, doc.index_of(node) + 1))
}
