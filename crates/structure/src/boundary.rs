//! Range boundary normalization.
//!
//! Push-down moves endpoints as deep into the tree as they can go so that
//! format code sees text-level positions. Pull-up moves them toward a bound
//! so structural code sees element-level positions. Neither changes which
//! content the range covers.

use std::cmp::Ordering;

use crate::category::{has_visible_text, is_inline, is_leaf, is_visible_leaf};
use crate::dom::{Document, NodeId, ZWS};
use crate::error::Result;
use crate::navigate::{nearest_with_tag, walk_next_block, walk_previous_block};
use crate::range::{
    Point, Range, common_ancestor, compare_points, is_node_contained_in_range, node_after_offset,
    node_before_offset,
};
use crate::walker::{Show, TreeWalker};

fn is_placeholder_text(doc: &Document, node: NodeId) -> bool {
    doc.text(node)
        .is_some_and(|text| text.chars().all(|c| c == ZWS))
}

/// Whether a `BR` ends a line, as opposed to only keeping its block open.
pub fn is_line_break(doc: &Document, br: NodeId, if_empty_block: bool) -> bool {
    let Some(mut block) = doc.parent(br) else {
        return false;
    };
    while is_inline(doc, block) {
        match doc.parent(block) {
            Some(parent) => block = parent,
            None => break,
        }
    }
    let mut walker = TreeWalker::new(doc, block, Show::All, |doc, node| {
        doc.is_element(node)
            || doc
                .text(node)
                .is_some_and(|text| text.chars().any(|c| !c.is_whitespace()))
    });
    walker.set_current(br);
    if walker.next_node().is_some() {
        return true;
    }
    walker.set_current(br);
    if_empty_block && walker.previous_node().is_none()
}

fn push_start_down(doc: &Document, start: Point) -> Point {
    let Point {
        node: mut container,
        mut offset,
    } = start;
    while !doc.is_text(container) {
        match doc.child_at(container, offset) {
            Some(child) if !is_leaf(doc, child) => {
                container = child;
                offset = 0;
            }
            _ => {
                if offset > 0
                    && let Some(previous) = doc.child_at(container, offset - 1)
                    && doc.is_text(previous)
                {
                    let mut text = previous;
                    while is_placeholder_text(doc, text) {
                        match doc.previous_sibling(text) {
                            Some(prev) if doc.is_text(prev) => text = prev,
                            _ => break,
                        }
                    }
                    container = text;
                    offset = doc.length(text);
                }
                break;
            }
        }
    }
    Point::new(container, offset)
}

fn push_end_down(doc: &Document, end: Point) -> Point {
    let Point {
        node: mut container,
        mut offset,
    } = end;
    if offset > 0 {
        while !doc.is_text(container) {
            let child = offset.checked_sub(1).and_then(|ix| doc.child_at(container, ix));
            match child {
                Some(child) if !is_leaf(doc, child) => {
                    container = child;
                    offset = doc.length(child);
                }
                Some(child) if doc.has_tag(child, "BR") && !is_line_break(doc, child, false) => {
                    offset -= 1;
                }
                _ => break,
            }
        }
    } else {
        while !doc.is_text(container) {
            match doc.first_child(container) {
                Some(child) if !is_leaf(doc, child) => container = child,
                _ => break,
            }
        }
    }
    Point::new(container, offset)
}

pub fn move_range_boundaries_down_tree(doc: &Document, range: &Range) -> Range {
    let mut start = push_start_down(doc, range.start);
    let end = push_end_down(doc, range.end);
    if compare_points(doc, start, end) == Ordering::Greater {
        start = end;
    }
    Range::new(start, end)
}

/// Moves endpoints up while they sit at the first or last position of their
/// container, stopping at `start_max`/`end_max` (default: the common ancestor)
/// and never passing `root`.
pub fn move_range_boundaries_up_tree(
    doc: &Document,
    range: &Range,
    start_max: Option<NodeId>,
    end_max: Option<NodeId>,
    root: NodeId,
) -> Range {
    let start_max = start_max.unwrap_or_else(|| common_ancestor(doc, range));
    let end_max = end_max.unwrap_or(start_max);

    let Point {
        node: mut start_container,
        offset: mut start_offset,
    } = range.start;
    while start_offset == 0 && start_container != start_max && start_container != root {
        let Some(parent) = doc.parent(start_container) else {
            break;
        };
        start_offset = doc.index_of(start_container);
        start_container = parent;
    }

    let Point {
        node: mut end_container,
        offset: mut end_offset,
    } = range.end;
    while end_container != end_max && end_container != root {
        if !doc.is_text(end_container)
            && let Some(child) = doc.child_at(end_container, end_offset)
            && doc.has_tag(child, "BR")
            && !is_line_break(doc, child, false)
        {
            end_offset += 1;
        }
        if end_offset != doc.length(end_container) {
            break;
        }
        let Some(parent) = doc.parent(end_container) else {
            break;
        };
        end_offset = doc.index_of(end_container) + 1;
        end_container = parent;
    }

    Range::new(
        Point::new(start_container, start_offset),
        Point::new(end_container, end_offset),
    )
}

/// Collapses the range out of the nearest `tag` ancestor of its end when
/// the end sits at that ancestor's trailing edge. Returns the new range and
/// the ancestor's parent, if a `tag` ancestor was found.
pub fn move_range_boundary_out_of(
    doc: &Document,
    range: &Range,
    tag: &str,
    root: NodeId,
) -> Result<(Range, Option<NodeId>)> {
    let Some(parent) =
        nearest_with_tag(doc, range.end.node, root, tag, None)?.and_then(|found| doc.parent(found))
    else {
        return Ok((*range, None));
    };
    let lifted = move_range_boundaries_up_tree(doc, range, Some(parent), Some(parent), root);
    if lifted.end.node == parent {
        Ok((Range::collapsed(lifted.end), Some(parent)))
    } else {
        Ok((*range, Some(parent)))
    }
}

pub fn start_block_of_range(doc: &Document, range: &Range, root: NodeId) -> Option<NodeId> {
    let container = range.start.node;
    let block = if is_inline(doc, container) {
        walk_previous_block(doc, container, root)
    } else if container != root && crate::category::is_block(doc, container) {
        Some(container)
    } else {
        let node = node_before_offset(doc, container, range.start.offset);
        walk_next_block(doc, node, root)
    };
    block.filter(|block| is_node_contained_in_range(doc, range, *block, true))
}

pub fn end_block_of_range(doc: &Document, range: &Range, root: NodeId) -> Option<NodeId> {
    let container = range.end.node;
    let block = if is_inline(doc, container) {
        walk_previous_block(doc, container, root)
    } else if container != root && crate::category::is_block(doc, container) {
        Some(container)
    } else {
        let node = match node_after_offset(doc, container, range.end.offset, root) {
            Some(node) if doc.contains(root, node) => node,
            _ => {
                let mut node = root;
                while let Some(last) = doc.last_child(node) {
                    node = last;
                }
                node
            }
        };
        walk_previous_block(doc, node, root)
    };
    block.filter(|block| is_node_contained_in_range(doc, range, *block, true))
}

fn is_content(doc: &Document, node: NodeId) -> bool {
    has_visible_text(doc, node) || is_visible_leaf(doc, node)
}

/// True when nothing visible lies between the start of its block and the
/// range start.
pub fn range_does_start_at_block_boundary(doc: &Document, range: &Range, root: NodeId) -> bool {
    let Point { node, offset } = range.start;
    if let Some(text) = doc.text(node)
        && text.chars().take(offset).any(|c| c != ZWS)
    {
        return false;
    }
    let Some(block) = start_block_of_range(doc, range, root) else {
        return false;
    };
    !doc.descendants(block).into_iter().any(|content| {
        if content == node || !is_content(doc, content) {
            return false;
        }
        let content_start = if doc.is_text(content) {
            Point::new(content, 0)
        } else {
            match crate::range::point_before(doc, content) {
                Ok(point) => point,
                Err(_) => return false,
            }
        };
        compare_points(doc, content_start, range.start) == Ordering::Less
    })
}

/// True when nothing visible lies between the range end and the end of its
/// block.
pub fn range_does_end_at_block_boundary(doc: &Document, range: &Range, root: NodeId) -> bool {
    let Point { node, offset } = range.end;
    if let Some(text) = doc.text(node)
        && text.chars().skip(offset).any(|c| c != ZWS)
    {
        return false;
    }
    let Some(block) = end_block_of_range(doc, range, root) else {
        return false;
    };
    !doc.descendants(block).into_iter().any(|content| {
        if content == node || !is_content(doc, content) {
            return false;
        }
        let content_end = if doc.is_text(content) {
            Point::new(content, doc.length(content))
        } else {
            match crate::range::point_after(doc, content) {
                Ok(point) => point,
                Err(_) => return false,
            }
        };
        compare_points(doc, content_end, range.end) == Ordering::Greater
    })
}

pub fn expand_range_to_block_boundaries(doc: &Document, range: &Range, root: NodeId) -> Result<Range> {
    let start_block = start_block_of_range(doc, range, root);
    let end_block = end_block_of_range(doc, range, root);
    let mut expanded = *range;
    if let (Some(start_block), Some(end_block)) = (start_block, end_block) {
        expanded.start = crate::range::point_before(doc, start_block)?;
        expanded.end = crate::range::point_after(doc, end_block)?;
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Node;

    #[test]
    fn push_down_skips_empty_trailing_text() {
        let doc = Document::from_nodes(&[Node::element(
            "P",
            vec![Node::text("ab"), Node::text("\u{200B}")],
        )]);
        let p = doc.first_child(doc.body()).unwrap();
        let ab = doc.first_child(p).unwrap();
        let range = Range::collapsed(Point::new(p, 2));
        let pushed = move_range_boundaries_down_tree(&doc, &range);
        assert_eq!(pushed.start, Point::new(ab, 2));
    }

    #[test]
    fn trailing_placeholder_br_is_not_a_line_break() {
        let doc = Document::from_nodes(&[Node::element(
            "P",
            vec![Node::text("ab"), Node::br()],
        )]);
        let p = doc.first_child(doc.body()).unwrap();
        let br = doc.last_child(p).unwrap();
        assert!(!is_line_break(&doc, br, false));
    }
}
