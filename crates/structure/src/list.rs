use tracing::debug;

use crate::boundary::{
    end_block_of_range, move_range_boundaries_down_tree, range_does_end_at_block_boundary,
    start_block_of_range,
};
use crate::category::is_list_tag;
use crate::config::EditorConfig;
use crate::dom::{Document, NodeId, ZWS};
use crate::error::{EditError, Result};
use crate::format::{merge_containers, remove_empty_inlines};
use crate::navigate::{nearest_with_tag, walk_next_block};
use crate::range::{Point, Range, common_ancestor};
use crate::split::{SplitAt, fix_cursor, split_node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "UL",
            ListKind::Ordered => "OL",
        }
    }
}

/// The list around the range and the direct items holding its endpoints.
/// An item is `None` when the endpoint sits past the last item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSelection {
    pub list: NodeId,
    pub start_item: Option<NodeId>,
    pub end_item: Option<NodeId>,
}

fn is_list(doc: &Document, node: NodeId) -> bool {
    doc.tag(node).is_some_and(is_list_tag)
}

fn item_in(doc: &Document, list: NodeId, node: Option<NodeId>) -> Option<NodeId> {
    let mut item = node?;
    while doc.parent(item) != Some(list) {
        item = doc.parent(item)?;
    }
    Some(item)
}

pub fn list_selection(doc: &Document, range: &Range, root: NodeId) -> Option<ListSelection> {
    let mut list = common_ancestor(doc, range);
    while list != root && !is_list(doc, list) {
        list = doc.parent(list)?;
    }
    if list == root {
        return None;
    }
    let start = if range.start.node == list {
        doc.child_at(list, range.start.offset)
    } else {
        Some(range.start.node)
    };
    let end = if range.end.node == list {
        doc.child_at(list, range.end.offset)
    } else {
        Some(range.end.node)
    };
    Some(ListSelection {
        list,
        start_item: item_in(doc, list, start),
        end_item: item_in(doc, list, end),
    })
}

/// Nests the selected items one level deeper. Declines when the range is not
/// in a list or starts at the list's first item.
pub fn increase_list_level(
    doc: &mut Document,
    root: NodeId,
    config: &EditorConfig,
    range: &Range,
) -> Result<bool> {
    let range = move_range_boundaries_down_tree(doc, range);
    let Some(ListSelection {
        list,
        start_item: Some(mut item),
        end_item,
    }) = list_selection(doc, &range, root)
    else {
        return Ok(false);
    };
    if doc.first_child(list) == Some(item) {
        return Ok(false);
    }
    let list_tag = doc.tag(list).unwrap_or_default().to_string();
    debug!(?list, list_tag, "increasing list level");

    let mut new_parent = doc
        .previous_sibling(item)
        .ok_or(EditError::Detached(item))?;
    if !doc.has_tag(new_parent, &list_tag) {
        new_parent = doc.create_element(&list_tag, config.tag_attributes_for(&list_tag));
        doc.insert_before(list, new_parent, Some(item))?;
    }
    loop {
        let next = if Some(item) == end_item {
            None
        } else {
            doc.next_sibling(item)
        };
        doc.append_child(new_parent, item)?;
        match next {
            Some(next) => item = next,
            None => break,
        }
    }
    if let Some(next) = doc.next_sibling(new_parent) {
        merge_containers(doc, next, &config.block_tag)?;
    }
    Ok(true)
}

/// Moves the selected items up one level. Items leaving the outermost list
/// become default blocks.
pub fn decrease_list_level(
    doc: &mut Document,
    root: NodeId,
    config: &EditorConfig,
    range: &Range,
) -> Result<bool> {
    let range = move_range_boundaries_down_tree(doc, range);
    let Some(selection) = list_selection(doc, &range, root) else {
        return Ok(false);
    };
    let list = selection.list;
    let (Some(mut item), Some(end_item)) = (
        selection.start_item.or(doc.first_child(list)),
        selection.end_item.or(doc.last_child(list)),
    ) else {
        return Ok(false);
    };
    debug!(?list, "decreasing list level");

    let mut new_parent = doc.parent(list).ok_or(EditError::Detached(list))?;
    let mut insert_before = match doc.next_sibling(end_item) {
        None => doc.next_sibling(list),
        Some(after) => split_node(doc, list, SplitAt::Before(Some(after)), new_parent)?,
    };

    if new_parent != root && doc.has_tag(new_parent, "LI") {
        let outer_item = new_parent;
        new_parent = doc.parent(outer_item).ok_or(EditError::Detached(outer_item))?;
        while let Some(node) = insert_before {
            insert_before = doc.next_sibling(node);
            doc.append_child(end_item, node)?;
        }
        insert_before = doc.next_sibling(outer_item);
    }

    let leaves_list = !is_list(doc, new_parent);
    loop {
        let next = if item == end_item {
            None
        } else {
            doc.next_sibling(item)
        };
        if leaves_list && doc.has_tag(item, "LI") {
            doc.set_element(item, &config.block_tag, config.block_attributes.clone())?;
            fix_cursor(doc, item)?;
        }
        doc.insert_before(new_parent, item, insert_before)?;
        match next {
            Some(next) => item = next,
            None => break,
        }
    }

    if doc.is_alive(list) && doc.first_child(list).is_none() {
        doc.remove(list);
    }
    if let Some(next) = insert_before {
        merge_containers(doc, next, &config.block_tag)?;
    }
    Ok(true)
}

fn blocks_in_range(doc: &Document, range: &Range, root: NodeId) -> Vec<NodeId> {
    let (Some(first), Some(last)) = (
        start_block_of_range(doc, range, root),
        end_block_of_range(doc, range, root),
    ) else {
        return Vec::new();
    };
    let mut blocks = vec![first];
    let mut current = first;
    while current != last {
        match walk_next_block(doc, current, root) {
            Some(next) => {
                blocks.push(next);
                current = next;
            }
            None => break,
        }
    }
    blocks
}

/// Turns every block in the range into an item of a `kind` list, retagging
/// lists of the other kind. Returns the affected items in order.
pub fn make_list(
    doc: &mut Document,
    root: NodeId,
    config: &EditorConfig,
    range: &Range,
    kind: ListKind,
) -> Result<Vec<NodeId>> {
    let range = move_range_boundaries_down_tree(doc, range);
    let list_tag = kind.tag();
    let list_attrs = config.tag_attributes_for(list_tag);
    let item_attrs = config.tag_attributes_for("LI");
    debug!(list_tag, "making list");

    let mut items = Vec::new();
    for block in blocks_in_range(doc, &range, root) {
        if !doc.is_alive(block) || doc.parent(block).is_none() {
            continue;
        }
        let node = match doc.parent(block) {
            Some(parent) if doc.has_tag(parent, "LI") => parent,
            _ => block,
        };
        if doc.has_tag(node, "LI") {
            if let Some(list) = doc.parent(node)
                && !doc.has_tag(list, list_tag)
                && is_list(doc, list)
            {
                doc.set_element(list, list_tag, list_attrs.clone())?;
            }
            if !items.contains(&node) {
                items.push(node);
            }
            continue;
        }

        let mut attrs = item_attrs.clone();
        if let Some(dir) = doc.attr(node, "dir") {
            attrs.insert("dir".to_string(), dir.to_string());
        }
        match doc.previous_sibling(node) {
            Some(prev) if doc.has_tag(prev, list_tag) => {
                doc.append_child(prev, node)?;
            }
            _ => {
                let list = doc.create_element(list_tag, list_attrs.clone());
                doc.replace_with(node, list)?;
                doc.append_child(list, node)?;
            }
        }
        doc.set_element(node, "LI", attrs)?;
        items.push(node);
    }

    if let Some(next) = items
        .last()
        .and_then(|item| doc.parent(*item))
        .and_then(|list| doc.next_sibling(list))
    {
        merge_containers(doc, next, &config.block_tag)?;
    }
    Ok(items)
}

/// Recognizes a typed list marker: `*`, `-`, `•` start a bulleted list,
/// digits followed by `.` or `)` a numbered one. Returns the kind and the
/// starting number.
pub fn parse_list_marker(marker: &str) -> Option<(ListKind, u32)> {
    match marker {
        "*" | "-" | "\u{2022}" => Some((ListKind::Unordered, 1)),
        _ => {
            let digits = marker
                .strip_suffix('.')
                .or_else(|| marker.strip_suffix(')'))?;
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok().map(|start| (ListKind::Ordered, start))
        }
    }
}

/// Converts the caret's block into a list item when its only text is a list
/// marker typed before the caret. Returns the caret inside the new item.
pub fn create_list_from_marker(
    doc: &mut Document,
    root: NodeId,
    config: &EditorConfig,
    range: &Range,
) -> Result<Option<Range>> {
    if !range.is_collapsed() {
        return Ok(None);
    }
    let Some(block) = start_block_of_range(doc, range, root) else {
        return Ok(None);
    };
    if nearest_with_tag(doc, block, root, "LI", None)?.is_some()
        || !range_does_end_at_block_boundary(doc, range, root)
    {
        return Ok(None);
    }
    let text: String = doc
        .text_content(block)
        .chars()
        .filter(|c| *c != ZWS)
        .collect();
    let Some((kind, start)) = parse_list_marker(text.trim()) else {
        return Ok(None);
    };
    debug!(?kind, start, "creating list from marker");

    for node in doc.descendants(block) {
        if doc.is_alive(node) && doc.is_text(node) {
            doc.remove(node);
        }
    }
    remove_empty_inlines(doc, block);
    fix_cursor(doc, block)?;

    let items = make_list(doc, root, config, &Range::collapsed(Point::new(block, 0)), kind)?;
    let Some(item) = items.first().copied() else {
        return Ok(None);
    };
    if kind == ListKind::Ordered
        && start != 1
        && let Some(list) = doc.parent(item)
    {
        doc.set_attr(list, "start", start.to_string())?;
    }
    Ok(Some(move_range_boundaries_down_tree(
        doc,
        &Range::collapsed(Point::new(item, 0)),
    )))
}
