use std::cmp::Ordering;

use tracing::debug;

use crate::bookmark::insert_node_in_range;
use crate::boundary::{
    end_block_of_range, move_range_boundaries_down_tree, move_range_boundary_out_of,
    start_block_of_range,
};
use crate::category::{is_container, is_empty_block, is_inline, is_void};
use crate::config::EditorConfig;
use crate::dom::{Attrs, Document, NodeId, ZWS};
use crate::error::{EditError, Result};
use crate::format::{merge_inlines, remove_empty_inlines, remove_zws};
use crate::navigate::{has_tag_attributes, nearest_with_tag};
use crate::range::{Point, Range, common_ancestor, compare_points, point_before};

/// Makes sure the caret has somewhere to sit: inlines get a placeholder
/// char, blocks with no content get a `BR`.
pub fn fix_cursor(doc: &mut Document, node: NodeId) -> Result<NodeId> {
    if doc.is_text(node) {
        return Ok(node);
    }
    if is_inline(doc, node) {
        while let Some(child) = doc.first_child(node) {
            if doc.text(child).is_some_and(str::is_empty) {
                doc.remove(child);
            } else {
                break;
            }
        }
        if doc.first_child(node).is_none() && !is_void(doc, node) {
            let placeholder = doc.create_text(ZWS.to_string());
            doc.append_child(node, placeholder)?;
        }
    } else if is_empty_block(doc, node)
        && !doc
            .descendants(node)
            .into_iter()
            .any(|child| doc.has_tag(child, "BR"))
    {
        let mut target = node;
        while let Some(last) = doc.last_child(target) {
            if doc.is_element(last) && !is_inline(doc, last) {
                target = last;
            } else {
                break;
            }
        }
        let br = doc.create_element("BR", Attrs::new());
        doc.append_child(target, br)?;
    }
    Ok(node)
}

/// Wraps runs of inline children of a container in blocks, recursing into
/// nested containers.
pub fn fix_container(doc: &mut Document, container: NodeId, block_tag: &str) -> Result<()> {
    let mut wrapper: Option<NodeId> = None;
    for child in doc.children(container) {
        let is_br = doc.has_tag(child, "BR");
        if !is_br && is_inline(doc, child) {
            let block = match wrapper {
                Some(block) => block,
                None => {
                    let block = doc.create_element(block_tag, Attrs::new());
                    wrapper = Some(block);
                    block
                }
            };
            doc.append_child(block, child)?;
        } else if is_br || wrapper.is_some() {
            let block = match wrapper.take() {
                Some(block) => block,
                None => doc.create_element(block_tag, Attrs::new()),
            };
            fix_cursor(doc, block)?;
            if is_br {
                doc.replace_with(child, block)?;
                doc.remove(child);
            } else {
                doc.insert_before(container, block, Some(child))?;
            }
        }
        if doc.is_alive(child) && doc.is_element(child) && is_container(doc, child) {
            fix_container(doc, child, block_tag)?;
        }
    }
    if let Some(block) = wrapper {
        fix_cursor(doc, block)?;
        doc.append_child(container, block)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAt {
    /// Char offset in a text node or child index in an element.
    Offset(usize),
    /// Before the given child, or at the end when `None`.
    Before(Option<NodeId>),
}

/// Splits `node` and its ancestors up to, not including, `stop`. Returns the
/// first node of the right-hand half at the level below `stop`.
pub fn split_node(doc: &mut Document, node: NodeId, at: SplitAt, stop: NodeId) -> Result<Option<NodeId>> {
    if doc.is_text(node) && node != stop {
        let SplitAt::Offset(offset) = at else {
            return Err(EditError::InvalidSplit("text nodes split at an offset"));
        };
        let parent = doc.parent(node).ok_or(EditError::Detached(node))?;
        let after = doc.split_text(node, offset)?;
        return split_node(doc, parent, SplitAt::Before(Some(after)), stop);
    }

    let mut after = match at {
        SplitAt::Offset(offset) => doc.child_at(node, offset),
        SplitAt::Before(child) => child,
    };
    let Some(parent) = doc.parent(node) else {
        return Ok(after);
    };
    if node == stop || !doc.is_element(node) {
        return Ok(after);
    }

    let clone = doc.clone_shallow(node);
    while let Some(child) = after {
        after = doc.next_sibling(child);
        doc.append_child(clone, child)?;
    }
    fix_cursor(doc, node)?;
    fix_cursor(doc, clone)?;
    let next = doc.next_sibling(node);
    doc.insert_before(parent, clone, next)?;
    split_node(doc, parent, SplitAt::Before(Some(clone)), stop)
}

fn child_of(doc: &Document, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = doc.parent(current)?;
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
}

/// Moves the content of `range` out of the tree, cloning partially covered
/// ancestors so the extracted nodes keep their nesting. Returns the detached
/// nodes in order and the point where the range collapsed to.
pub fn extract_contents(doc: &mut Document, range: &Range) -> Result<(Vec<NodeId>, Point)> {
    let mut fragment = Vec::new();
    if range.is_collapsed() {
        return Ok((fragment, range.start));
    }
    let Point {
        node: start_node,
        offset: start_offset,
    } = range.start;
    let Point {
        node: end_node,
        offset: end_offset,
    } = range.end;

    if start_node == end_node && doc.is_text(start_node) {
        let text = doc.substring(start_node, start_offset, end_offset)?;
        fragment.push(doc.create_text(text));
        doc.delete_text(start_node, start_offset, end_offset - start_offset)?;
        return Ok((fragment, range.start));
    }

    let common = common_ancestor(doc, range);
    let first_partial = if doc.contains(start_node, end_node) {
        None
    } else {
        child_of(doc, common, start_node)
    };
    let last_partial = if doc.contains(end_node, start_node) {
        None
    } else {
        child_of(doc, common, end_node)
    };
    let contained: Vec<NodeId> = doc
        .children(common)
        .into_iter()
        .filter(|child| {
            compare_points(doc, Point::new(*child, 0), range.start) == Ordering::Greater
                && compare_points(doc, Point::new(*child, doc.length(*child)), range.end) == Ordering::Less
        })
        .collect();

    let collapsed_to = if doc.contains(start_node, end_node) {
        range.start
    } else {
        let mut reference = start_node;
        while let Some(parent) = doc.parent(reference) {
            if doc.contains(parent, end_node) {
                break;
            }
            reference = parent;
        }
        crate::range::point_after(doc, reference)?
    };

    if let Some(first) = first_partial {
        if doc.is_text(first) {
            let length = doc.length(start_node);
            let text = doc.substring(start_node, start_offset, length)?;
            fragment.push(doc.create_text(text));
            doc.delete_text(start_node, start_offset, length - start_offset)?;
        } else {
            let clone = doc.clone_shallow(first);
            fragment.push(clone);
            let inner = Range::new(range.start, Point::new(first, doc.length(first)));
            let (nodes, _) = extract_contents(doc, &inner)?;
            doc.append_children(clone, &nodes)?;
        }
    }

    for child in contained {
        doc.detach(child);
        fragment.push(child);
    }

    if let Some(last) = last_partial {
        if doc.is_text(last) {
            let text = doc.substring(end_node, 0, end_offset)?;
            fragment.push(doc.create_text(text));
            doc.delete_text(end_node, 0, end_offset)?;
        } else {
            let clone = doc.clone_shallow(last);
            fragment.push(clone);
            let inner = Range::new(Point::new(last, 0), range.end);
            let (nodes, _) = extract_contents(doc, &inner)?;
            doc.append_children(clone, &nodes)?;
        }
    }

    Ok((fragment, collapsed_to))
}

/// Appends the content of `next` to `block`, dropping `next` and any
/// wrappers it was the only child of. Returns the join point.
fn merge_with_block(doc: &mut Document, block: NodeId, next: NodeId, root: NodeId) -> Result<Point> {
    let mut container = next;
    while let Some(parent) = doc.parent(container) {
        if parent == root || !doc.is_element(parent) || doc.child_count(parent) != 1 {
            break;
        }
        container = parent;
    }
    doc.detach(container);

    let mut offset = doc.child_count(block);
    if let Some(last) = doc.last_child(block)
        && doc.has_tag(last, "BR")
    {
        doc.remove(last);
        offset -= 1;
    }
    let moved = doc.empty(next);
    doc.append_children(block, &moved)?;
    doc.remove(container);

    let mut range = Range::collapsed(Point::new(block, offset));
    merge_inlines(doc, block, &mut range)?;
    Ok(range.start)
}

pub fn delete_contents_of_range(doc: &mut Document, root: NodeId, block_tag: &str, range: &Range) -> Result<Range> {
    let start_block = start_block_of_range(doc, range, root);
    let end_block = end_block_of_range(doc, range, root);

    let (removed, mut caret) = extract_contents(doc, range)?;
    for node in removed {
        doc.remove(node);
    }

    if let (Some(start_block), Some(end_block)) = (start_block, end_block)
        && start_block != end_block
        && doc.is_alive(end_block)
        && doc.parent(end_block).is_some()
    {
        caret = merge_with_block(doc, start_block, end_block, root)?;
    }
    if let Some(start_block) = start_block
        && doc.is_alive(start_block)
    {
        fix_cursor(doc, start_block)?;
    }
    if doc.first_child(root).is_none() {
        let block = doc.create_element(block_tag, Attrs::new());
        fix_cursor(doc, block)?;
        doc.append_child(root, block)?;
        caret = Point::new(block, 0);
    }
    Ok(Range::collapsed(caret))
}

/// Inserts text at a point, reusing an adjacent text node when there is one.
/// Returns the point just after the inserted text.
pub fn insert_text_at(doc: &mut Document, point: Point, text: &str) -> Result<Point> {
    let inserted = text.chars().count();
    if doc.is_text(point.node) {
        doc.insert_text(point.node, point.offset, text)?;
        return Ok(Point::new(point.node, point.offset + inserted));
    }
    let point = if is_void(doc, point.node) {
        point_before(doc, point.node)?
    } else {
        point
    };
    if let Some(prev) = point
        .offset
        .checked_sub(1)
        .and_then(|ix| doc.child_at(point.node, ix))
        .filter(|prev| doc.is_text(*prev))
    {
        doc.append_text(prev, text)?;
        return Ok(Point::new(prev, doc.length(prev)));
    }
    if let Some(next) = doc
        .child_at(point.node, point.offset)
        .filter(|next| doc.is_text(*next))
    {
        doc.insert_text(next, 0, text)?;
        return Ok(Point::new(next, inserted));
    }
    let node = doc.create_text(text);
    doc.insert_at(point.node, point.offset, node)?;
    Ok(Point::new(node, inserted))
}

pub fn tag_after_split(tag: &str) -> Option<&'static str> {
    match tag {
        "DT" => Some("DD"),
        "DD" => Some("DT"),
        "LI" => Some("LI"),
        "PRE" => Some("PRE"),
        _ => None,
    }
}

fn clean_block(doc: &mut Document, block: NodeId) -> Result<()> {
    remove_zws(doc, block, None)?;
    remove_empty_inlines(doc, block);
    fix_cursor(doc, block)?;
    Ok(())
}

/// Splits the block at the caret (Enter), or inserts a line break when
/// `line_break_only`, inside table cells and outside any block. An empty list
/// item leaves the list instead. Returns the new caret.
pub fn split_block(
    doc: &mut Document,
    root: NodeId,
    config: &EditorConfig,
    range: &Range,
    line_break_only: bool,
) -> Result<Range> {
    let mut range = *range;
    if !range.is_collapsed() {
        range = delete_contents_of_range(doc, root, &config.block_tag, &range)?;
    }

    let block = start_block_of_range(doc, &range, root);

    let pre = match block {
        Some(block) => nearest_with_tag(doc, block, root, "PRE", None)?,
        None => None,
    };
    if let Some(pre) = pre {
        let caret = move_range_boundaries_down_tree(doc, &range).start;
        let caret = insert_text_at(doc, caret, "\n")?;
        fix_cursor(doc, pre)?;
        debug!(?caret, "inserted newline in preformatted block");
        return Ok(Range::collapsed(caret));
    }

    let block = match block {
        Some(block) if !line_break_only && !matches!(doc.tag(block), Some("TD" | "TH")) => block,
        _ => {
            let (range, _) = move_range_boundary_out_of(doc, &range, "A", root)?;
            let br = doc.create_element("BR", Attrs::new());
            let range = insert_node_in_range(doc, &range, br)?;
            return Ok(range.collapse_to_end());
        }
    };

    let block = nearest_with_tag(doc, block, root, "LI", None)?.unwrap_or(block);
    if is_empty_block(doc, block)
        && (nearest_with_tag(doc, block, root, "UL", None)?.is_some()
            || nearest_with_tag(doc, block, root, "OL", None)?.is_some())
    {
        crate::list::decrease_list_level(doc, root, config, &range)?;
        return Ok(range);
    }

    let block_tag = doc.tag(block).unwrap_or_default().to_string();
    let block_parent = doc.parent(block).ok_or(EditError::Detached(block))?;
    let mut after = split_node(doc, range.start.node, SplitAt::Offset(range.start.offset), block_parent)?
        .ok_or(EditError::InvalidSplit("block split produced no right half"))?;

    let (split_tag, split_attrs) = match tag_after_split(&block_tag) {
        Some(tag) => (tag.to_string(), None),
        None => (config.block_tag.clone(), Some(&config.block_attributes)),
    };
    if !has_tag_attributes(doc, after, &split_tag, split_attrs) {
        let replacement = doc.create_element(&split_tag, split_attrs.cloned().unwrap_or_default());
        if let Some(dir) = doc.attr(after, "dir").map(str::to_string) {
            doc.set_attr(replacement, "dir", dir)?;
        }
        doc.replace_with(after, replacement)?;
        let moved = doc.empty(after);
        doc.append_children(replacement, &moved)?;
        doc.remove(after);
        after = replacement;
        clean_block(doc, after)?;
    }
    clean_block(doc, block)?;

    let mut focus = after;
    while doc.is_element(focus) {
        if doc.has_tag(focus, "A") {
            let text = doc.text_content(focus);
            if text.is_empty() || text == ZWS.to_string() {
                let empty = doc.create_text("");
                doc.replace_with(focus, empty)?;
                doc.remove(focus);
                focus = empty;
                break;
            }
        }
        let mut child = doc.first_child(focus);
        while let Some(current) = child {
            if !doc.text(current).is_some_and(str::is_empty) {
                break;
            }
            let next = doc.next_sibling(current);
            match next {
                Some(next) if !doc.has_tag(next, "BR") => {
                    doc.remove(current);
                    child = Some(next);
                }
                _ => break,
            }
        }
        match child {
            Some(child) if doc.is_element(child) && !doc.has_tag(child, "BR") => focus = child,
            _ => break,
        }
    }
    debug!(?focus, "split block");
    Ok(Range::collapsed(Point::new(focus, 0)))
}

/// Splits the content of `container` at the range into a "before" and an
/// "after" part and rebuilds the container from them, dropping whatever the
/// range covered. Bare text is wrapped in a `block_tag` block. Returns the
/// first top-level node of the "after" part.
pub fn split_document(
    doc: &mut Document,
    range: &Range,
    container: Option<NodeId>,
    block_tag: &str,
) -> Result<Option<NodeId>> {
    let Some(container) = container else {
        return Ok(None);
    };
    if doc.first_child(container).is_none() {
        return Ok(None);
    }
    doc.validate_range(range, container)?;
    let range = move_range_boundaries_down_tree(doc, range);

    let after_range = Range::new(range.end, Point::new(container, doc.child_count(container)));
    let (after_nodes, _) = extract_contents(doc, &after_range)?;
    let before_range = Range::new(Point::new(container, 0), range.start);
    let (before_nodes, _) = extract_contents(doc, &before_range)?;

    for leftover in doc.empty(container) {
        doc.remove(leftover);
    }

    let append = |doc: &mut Document, node: NodeId| -> Result<NodeId> {
        let node = if doc.is_text(node) {
            let block = doc.create_element(block_tag, Attrs::new());
            doc.append_child(block, node)?;
            block
        } else {
            node
        };
        doc.append_child(container, node)?;
        Ok(node)
    };
    for node in before_nodes {
        append(doc, node)?;
    }
    let mut first_after = None;
    for node in after_nodes {
        let node = append(doc, node)?;
        first_after.get_or_insert(node);
    }
    debug!(?first_after, "split document");
    Ok(first_after)
}
