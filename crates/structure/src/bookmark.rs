//! Selection bookmarks.
//!
//! Mutations that split, wrap and unwrap nodes would invalidate raw offsets,
//! so the range is parked as two marker elements in the tree and recovered
//! from their final positions afterwards.

use std::cmp::Ordering;

use tracing::trace;

use crate::dom::{Attrs, Document, NodeId};
use crate::error::{EditError, Result};
use crate::format::merge_inlines;
use crate::range::{Point, Range, compare_points};

pub const BOOKMARK_ATTR: &str = "data-bookmark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    start: NodeId,
    end: NodeId,
}

pub fn is_bookmark(doc: &Document, node: NodeId) -> bool {
    doc.has_tag(node, "INPUT") && doc.attr(node, BOOKMARK_ATTR).is_some()
}

fn create_marker(doc: &mut Document, side: &str) -> NodeId {
    let mut attrs = Attrs::new();
    attrs.insert("type".to_string(), "hidden".to_string());
    attrs.insert(BOOKMARK_ATTR.to_string(), side.to_string());
    doc.create_element("INPUT", attrs)
}

/// Inserts `node` at the range start, splitting a text start container so
/// the node lands between siblings. Returns the range adjusted to still
/// cover its original content, with `node` at its front.
pub fn insert_node_in_range(doc: &mut Document, range: &Range, node: NodeId) -> Result<Range> {
    let Point {
        node: mut start_container,
        offset: mut start_offset,
    } = range.start;
    let Point {
        node: mut end_container,
        offset: mut end_offset,
    } = range.end;

    if doc.is_text(start_container) {
        let parent = doc
            .parent(start_container)
            .ok_or(EditError::Detached(start_container))?;
        if start_offset == doc.length(start_container) {
            start_offset = doc.index_of(start_container) + 1;
            if range.is_collapsed() {
                end_container = parent;
                end_offset = start_offset;
            }
        } else {
            if start_offset > 0 {
                let after = doc.split_text(start_container, start_offset)?;
                if end_container == start_container {
                    end_offset -= start_offset;
                    end_container = after;
                } else if end_container == parent {
                    end_offset += 1;
                }
                start_container = after;
            }
            start_offset = doc.index_of(start_container);
        }
        start_container = parent;
    }

    doc.insert_at(start_container, start_offset, node)?;
    if start_container == end_container {
        end_offset += 1;
    }
    Ok(Range::new(
        Point::new(start_container, start_offset),
        Point::new(end_container, end_offset),
    ))
}

impl Bookmark {
    pub fn save(doc: &mut Document, range: &Range) -> Result<Self> {
        let start = create_marker(doc, "start");
        let end = create_marker(doc, "end");
        let inserted = insert_node_in_range(doc, range, start)?;
        insert_node_in_range(doc, &inserted.collapse_to_end(), end)?;

        let start_point = crate::range::point_before(doc, start)?;
        let end_point = crate::range::point_before(doc, end)?;
        let bookmark = if compare_points(doc, start_point, end_point) == Ordering::Greater {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        };
        trace!(?bookmark, "saved selection bookmark");
        Ok(bookmark)
    }

    /// The content between the markers.
    pub fn inner_range(&self, doc: &Document) -> Result<Range> {
        let start = crate::range::point_after(doc, self.start)?;
        let end = crate::range::point_before(doc, self.end)?;
        Ok(Range::new(start, end))
    }

    pub fn markers(&self) -> [NodeId; 2] {
        [self.start, self.end]
    }

    /// Removes the markers, merges what they separated and returns the range
    /// they delimited.
    pub fn restore(self, doc: &mut Document) -> Result<Range> {
        let start_point = crate::range::point_before(doc, self.start)?;
        let mut end_point = crate::range::point_before(doc, self.end)?;
        if start_point.node == end_point.node {
            end_point.offset -= 1;
        }
        doc.remove(self.start);
        doc.remove(self.end);

        let mut range = Range::new(start_point, end_point);
        merge_inlines(doc, start_point.node, &mut range)?;
        if start_point.node != end_point.node && doc.is_alive(end_point.node) {
            merge_inlines(doc, end_point.node, &mut range)?;
        }

        if range.is_collapsed() && doc.is_element(range.start.node) {
            let Point { node, offset } = range.start;
            if let Some(child) = doc.child_at(node, offset).filter(|c| doc.is_text(*c)) {
                range = Range::collapsed(Point::new(child, 0));
            } else if let Some(child) = offset
                .checked_sub(1)
                .and_then(|ix| doc.child_at(node, ix))
                .filter(|c| doc.is_text(*c))
            {
                range = Range::collapsed(Point::new(child, doc.length(child)));
            }
        }
        Ok(range)
    }
}

/// Runs `apply` once per range with every other range parked in a bookmark,
/// so earlier edits cannot shift later ranges. Returns the resulting ranges
/// in input order.
pub fn for_each_range(
    doc: &mut Document,
    ranges: &[Range],
    mut apply: impl FnMut(&mut Document, Range) -> Result<Range>,
) -> Result<Vec<Range>> {
    let mut order: Vec<usize> = (0..ranges.len()).collect();
    order.sort_by(|a, b| compare_points(doc, ranges[*b].start, ranges[*a].start));

    let mut bookmarks: Vec<Option<Bookmark>> = vec![None; ranges.len()];
    for ix in order {
        bookmarks[ix] = Some(Bookmark::save(doc, &ranges[ix])?);
    }

    let mut results = Vec::with_capacity(ranges.len());
    for bookmark in bookmarks.into_iter().flatten() {
        let range = bookmark.restore(doc)?;
        results.push(apply(doc, range)?);
    }
    Ok(results)
}
