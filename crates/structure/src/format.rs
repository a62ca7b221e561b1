//! Inline formatting: wrapping, unwrapping and merging format elements.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bookmark::{Bookmark, for_each_range, insert_node_in_range, is_bookmark};
use crate::boundary::move_range_boundaries_down_tree;
use crate::category::{is_container, is_inline, is_list_tag, is_void};
use crate::dom::{Attrs, Document, NodeId, ZWS};
use crate::error::Result;
use crate::navigate::{AncestorScope, nearest_ancestor};
use crate::range::{Point, Range, common_ancestor, is_node_contained_in_range};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrConstraint {
    Exact(String),
    /// Matches any value; never written when creating a node.
    Any,
}

/// Tag plus attribute constraints describing one kind of format element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub tag: String,
    #[serde(default)]
    pub attributes: IndexMap<String, AttrConstraint>,
}

impl FormatSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            attributes: IndexMap::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.to_string(), AttrConstraint::Exact(value.into()));
        self
    }

    pub fn any_attr(mut self, name: &str) -> Self {
        self.attributes.insert(name.to_string(), AttrConstraint::Any);
        self
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        if doc.tag(node) != Some(self.tag.as_str()) {
            return false;
        }
        self.attributes.iter().all(|(name, constraint)| {
            match (constraint, doc.attr(node, name)) {
                (_, None) => false,
                (AttrConstraint::Any, Some(_)) => true,
                (AttrConstraint::Exact(expected), Some(actual)) if name == "style" => {
                    expected.eq_ignore_ascii_case(actual)
                }
                (AttrConstraint::Exact(expected), Some(actual)) => expected == actual,
            }
        })
    }

    fn concrete_attrs(&self) -> Attrs {
        self.attributes
            .iter()
            .filter_map(|(name, constraint)| match constraint {
                AttrConstraint::Exact(value) => Some((name.clone(), value.clone())),
                AttrConstraint::Any => None,
            })
            .collect()
    }

    fn create(&self, doc: &mut Document) -> NodeId {
        doc.create_element(&self.tag, self.concrete_attrs())
    }
}

fn nearest_format(doc: &Document, node: NodeId, root: NodeId, spec: &FormatSpec) -> Option<NodeId> {
    nearest_ancestor(doc, node, root, AncestorScope::INCLUSIVE, |doc, candidate| {
        spec.matches(doc, candidate)
    })
    .ok()
    .flatten()
}

/// Two siblings that may be fused into one: both text, or equal elements
/// that are not anchors, leaves or bookmarks.
pub fn are_alike(doc: &Document, a: NodeId, b: NodeId) -> bool {
    if doc.is_text(a) && doc.is_text(b) {
        return true;
    }
    let (Some(left), Some(right)) = (doc.element(a), doc.element(b)) else {
        return false;
    };
    if left.tag != right.tag || left.tag == "A" || is_void(doc, a) || is_void(doc, b) {
        return false;
    }
    if is_bookmark(doc, a) || is_bookmark(doc, b) || left.attrs.len() != right.attrs.len() {
        return false;
    }
    left.attrs.iter().all(|(name, value)| match right.attrs.get(name) {
        Some(other) if name == "style" => value.eq_ignore_ascii_case(other),
        Some(other) => value == other,
        None => false,
    })
}

fn shift_point_into_previous(
    doc: &Document,
    point: &mut Point,
    parent: NodeId,
    child: NodeId,
    prev: NodeId,
    index: usize,
) {
    if point.node == child {
        *point = Point::new(prev, point.offset + doc.length(prev));
    } else if point.node == parent {
        if point.offset > index {
            point.offset -= 1;
        } else if point.offset == index {
            *point = Point::new(prev, doc.length(prev));
        }
    }
}

/// Fuses adjacent alike inline children throughout the subtree of `node`,
/// keeping `range` on the same content.
pub fn merge_inlines(doc: &mut Document, node: NodeId, range: &mut Range) -> Result<()> {
    let children = doc.children(node);
    let mut fragments: Vec<Vec<NodeId>> = Vec::new();
    let mut index = children.len();
    while index > 0 {
        index -= 1;
        let child = children[index];
        let prev = index.checked_sub(1).map(|ix| children[ix]);
        match prev {
            Some(prev) if is_inline(doc, child) && are_alike(doc, child, prev) => {
                shift_point_into_previous(doc, &mut range.start, node, child, prev, index);
                shift_point_into_previous(doc, &mut range.end, node, child, prev, index);
                doc.detach(child);
                if let Some(text) = doc.text(child).map(str::to_string) {
                    doc.append_text(prev, &text)?;
                    doc.remove(child);
                } else {
                    fragments.push(doc.empty(child));
                    doc.remove(child);
                }
            }
            _ if doc.is_element(child) => {
                while let Some(fragment) = fragments.pop() {
                    doc.append_children(child, &fragment)?;
                }
                merge_inlines(doc, child, range)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Merges `node` into its previous sibling when both are alike containers.
pub fn merge_containers(doc: &mut Document, node: NodeId, block_tag: &str) -> Result<()> {
    let prev = doc.previous_sibling(node);
    let first = doc.first_child(node);
    let is_list_item = doc.has_tag(node, "LI");

    if is_list_item && !first.is_some_and(|f| doc.tag(f).is_some_and(is_list_tag)) {
        return Ok(());
    }

    match prev {
        Some(prev) if are_alike(doc, prev, node) => {
            if !is_container(doc, prev) {
                if !is_list_item {
                    return Ok(());
                }
                let block = doc.create_element(block_tag, Attrs::new());
                let moved = doc.empty(prev);
                doc.append_children(block, &moved)?;
                doc.append_child(prev, block)?;
            }
            let needs_fix = !is_container(doc, node);
            let moved = doc.empty(node);
            doc.append_children(prev, &moved)?;
            doc.remove(node);
            if needs_fix {
                crate::split::fix_container(doc, prev, block_tag)?;
            }
            if let Some(first) = first {
                merge_containers(doc, first, block_tag)?;
            }
        }
        _ if is_list_item => {
            let block = doc.create_element(block_tag, Attrs::new());
            doc.insert_before(node, block, first)?;
            crate::split::fix_cursor(doc, block)?;
        }
        _ => {}
    }
    Ok(())
}

/// Strips placeholder chars from text under `root`, dropping nodes and empty
/// inline wrappers left with nothing. Text directly inside `keep` survives.
pub fn remove_zws(doc: &mut Document, root: NodeId, keep: Option<NodeId>) -> Result<()> {
    for node in doc.descendants(root) {
        if !doc.is_alive(node) || !doc.contains(root, node) {
            continue;
        }
        let Some(text) = doc.text(node) else {
            continue;
        };
        if !text.contains(ZWS) || (keep.is_some() && doc.parent(node) == keep) {
            continue;
        }
        let stripped: String = text.chars().filter(|c| *c != ZWS).collect();
        if !stripped.is_empty() {
            doc.set_text(node, stripped)?;
            continue;
        }
        let mut current = node;
        while let Some(parent) = doc.parent(current) {
            doc.remove(current);
            if parent == root || !is_inline(doc, parent) || doc.length(parent) > 0 {
                break;
            }
            current = parent;
        }
    }
    Ok(())
}

fn enclosing_block(doc: &Document, node: NodeId, root: NodeId) -> NodeId {
    let mut block = node;
    while is_inline(doc, block) && block != root {
        match doc.parent(block) {
            Some(parent) => block = parent,
            None => break,
        }
    }
    block
}

fn add_format(doc: &mut Document, root: NodeId, spec: &FormatSpec, range: &Range) -> Result<Range> {
    if range.is_collapsed() {
        let el = spec.create(doc);
        crate::split::fix_cursor(doc, el)?;
        insert_node_in_range(doc, range, el)?;
        let focus = doc.first_child(el).unwrap_or(el);
        let offset = if doc.is_text(focus) { doc.length(focus) } else { 0 };

        let block = enclosing_block(doc, el, root);
        remove_zws(doc, block, Some(el))?;
        return Ok(Range::collapsed(Point::new(focus, offset)));
    }

    let common = common_ancestor(doc, range);
    let candidates: Vec<NodeId> = doc
        .descendants(common)
        .into_iter()
        .filter(|node| {
            (doc.is_text(*node) || doc.has_tag(*node, "BR") || doc.has_tag(*node, "IMG"))
                && !is_bookmark(doc, *node)
                && is_node_contained_in_range(doc, range, *node, true)
        })
        .collect();

    let Point {
        node: mut start_container,
        offset: mut start_offset,
    } = range.start;
    let Point {
        node: mut end_container,
        offset: mut end_offset,
    } = range.end;

    if !candidates.contains(&start_container) {
        let Some(first) = candidates.first() else {
            return Ok(*range);
        };
        start_container = *first;
        start_offset = 0;
    }

    for candidate in candidates {
        let mut node = candidate;
        if nearest_format(doc, node, root, spec).is_some() {
            continue;
        }
        if doc.is_text(node) {
            let length = doc.length(node);
            let from = if node == start_container { start_offset } else { 0 };
            let to = if node == end_container { end_offset } else { length };
            if from >= to {
                continue;
            }
            if node == end_container && length > end_offset {
                doc.split_text(node, end_offset)?;
            }
            if node == start_container && start_offset > 0 {
                let parent = doc.parent(node);
                let after = doc.split_text(node, start_offset)?;
                if end_container == start_container {
                    end_container = after;
                    end_offset -= start_offset;
                } else if Some(end_container) == parent {
                    end_offset += 1;
                }
                start_container = after;
                start_offset = 0;
                node = after;
            }
        }
        let el = spec.create(doc);
        doc.replace_with(node, el)?;
        doc.append_child(el, node)?;
    }

    Ok(Range::new(
        Point::new(start_container, start_offset),
        Point::new(end_container, end_offset),
    ))
}

fn examine(
    doc: &mut Document,
    range: &Range,
    node: NodeId,
    exemplar: NodeId,
    to_wrap: &mut Vec<(NodeId, NodeId)>,
) -> Result<()> {
    if is_node_contained_in_range(doc, range, node, false) {
        return Ok(());
    }
    if !is_node_contained_in_range(doc, range, node, true) {
        let empty_text = doc.text(node).is_some_and(str::is_empty);
        if !is_bookmark(doc, node) && !empty_text {
            to_wrap.push((exemplar, node));
        }
        return Ok(());
    }
    if doc.is_text(node) {
        if node == range.end.node && range.end.offset != doc.length(node) {
            let after = doc.split_text(node, range.end.offset)?;
            to_wrap.push((exemplar, after));
        }
        if node == range.start.node && range.start.offset > 0 {
            doc.split_text(node, range.start.offset)?;
            to_wrap.push((exemplar, node));
        }
    } else {
        for child in doc.children(node) {
            examine(doc, range, child, exemplar, to_wrap)?;
        }
    }
    Ok(())
}

fn remove_format(doc: &mut Document, root: NodeId, spec: &FormatSpec, range: &Range) -> Result<Range> {
    let bookmark = Bookmark::save(doc, range)?;
    let mut fixer = None;
    let inner = bookmark.inner_range(doc)?;
    if inner.is_collapsed() {
        let text = doc.create_text(ZWS.to_string());
        insert_node_in_range(doc, &inner, text)?;
        fixer = Some(text);
    }
    let inner = bookmark.inner_range(doc)?;

    let block_root = enclosing_block(doc, common_ancestor(doc, &inner), root);

    let formats: Vec<NodeId> = doc
        .descendants(block_root)
        .into_iter()
        .skip(1)
        .filter(|node| {
            spec.matches(doc, *node) && is_node_contained_in_range(doc, &inner, *node, true)
        })
        .collect();

    let mut to_wrap = Vec::new();
    for format in &formats {
        examine(doc, &inner, *format, *format, &mut to_wrap)?;
    }
    for (exemplar, node) in to_wrap {
        let el = doc.clone_shallow(exemplar);
        doc.replace_with(node, el)?;
        doc.append_child(el, node)?;
    }
    for format in formats {
        doc.unwrap_element(format)?;
    }

    if let Some(fixer) = fixer
        && let Some(keep) = doc.parent(fixer)
    {
        let block = enclosing_block(doc, keep, root);
        remove_zws(doc, block, Some(keep))?;
    }

    let mut range = bookmark.restore(doc)?;
    if fixer.is_some() {
        range = range.collapse_to_end();
    }
    merge_inlines(doc, block_root, &mut range)?;
    Ok(range)
}

fn expand_to_whole_text(doc: &Document, range: Range) -> Range {
    let mut expanded = range;
    if doc.is_text(range.start.node) && range.start.offset < doc.length(range.start.node) {
        expanded.start.offset = 0;
    }
    if doc.is_text(range.end.node) && range.end.offset > 0 {
        expanded.end.offset = doc.length(range.end.node);
    }
    expanded
}

/// Removes then adds a format over `range`.
///
/// With `partial` the exact endpoints are honoured and text nodes are split
/// at them. Otherwise endpoints inside a text node grow to cover the whole
/// node. A collapsed range adds an empty format element holding the caret,
/// or moves the caret out of the removed format.
pub fn change_format(
    doc: &mut Document,
    root: NodeId,
    add: Option<&FormatSpec>,
    remove: Option<&FormatSpec>,
    range: &Range,
    partial: bool,
) -> Result<Range> {
    doc.validate_range(range, root)?;
    let mut range = move_range_boundaries_down_tree(doc, range);
    if !partial && !range.is_collapsed() {
        range = expand_to_whole_text(doc, range);
    }
    debug!(?range, add = ?add.map(|spec| &spec.tag), remove = ?remove.map(|spec| &spec.tag), partial, "changing format");
    if let Some(remove) = remove {
        range = remove_format(doc, root, remove, &range)?;
    }
    if let Some(add) = add {
        range = add_format(doc, root, add, &range)?;
        if !range.is_collapsed() {
            let block = enclosing_block(doc, common_ancestor(doc, &range), root);
            merge_inlines(doc, block, &mut range)?;
        }
    }
    Ok(range)
}

/// [`change_format`] over several ranges, isolating each from the edits made
/// for the others.
pub fn change_format_across(
    doc: &mut Document,
    root: NodeId,
    add: Option<&FormatSpec>,
    remove: Option<&FormatSpec>,
    ranges: &[Range],
    partial: bool,
) -> Result<Vec<Range>> {
    for range in ranges {
        doc.validate_range(range, root)?;
    }
    for_each_range(doc, ranges, |doc, range| {
        change_format(doc, root, add, remove, &range, partial)
    })
}

/// True when every text node touched by the range sits inside the format.
pub fn has_format(doc: &Document, root: NodeId, spec: &FormatSpec, range: &Range) -> bool {
    let common = common_ancestor(doc, range);
    if nearest_format(doc, common, root, spec).is_some() {
        return true;
    }
    if doc.is_text(common) {
        return false;
    }
    let mut seen = false;
    for node in doc.descendants(common) {
        if !doc.is_text(node) || !is_node_contained_in_range(doc, range, node, true) {
            continue;
        }
        if nearest_format(doc, node, common, spec).is_none() {
            return false;
        }
        seen = true;
    }
    seen
}

pub fn remove_empty_inlines(doc: &mut Document, node: NodeId) {
    for child in doc.children(node).into_iter().rev() {
        if doc.is_element(child) && !is_void(doc, child) {
            remove_empty_inlines(doc, child);
            if is_inline(doc, child) && doc.first_child(child).is_none() {
                doc.remove(child);
            }
        } else if doc.text(child).is_some_and(str::is_empty) {
            doc.remove(child);
        }
    }
}
