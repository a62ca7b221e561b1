use tracing::debug;

use crate::bookmark::for_each_range;
use crate::boundary::{move_range_boundaries_up_tree, range_does_start_at_block_boundary};
use crate::dom::{Document, NodeId};
use crate::editor::Editor;
use crate::error::{EditError, Result};
use crate::format::{FormatSpec, change_format};
use crate::range::{Point, Range, is_node_contained_in_range};

/// The parts of the document font changes distinguish: the editable area and
/// an optional signature block directly inside it, which "replace all" skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontRegions {
    pub editing: NodeId,
    pub signature: Option<NodeId>,
}

impl FontRegions {
    pub fn new(editing: NodeId) -> Self {
        Self {
            editing,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: NodeId) -> Self {
        self.signature = Some(signature);
        self
    }

    fn validate(&self, doc: &Document, root: NodeId) -> Result<()> {
        doc.ensure_within(self.editing, root)?;
        if let Some(signature) = self.signature {
            doc.ensure_alive(signature)?;
            if doc.parent(signature) != Some(self.editing) {
                return Err(EditError::NodeOutsideRoot {
                    node: signature,
                    root: self.editing,
                });
            }
        }
        Ok(())
    }

    fn in_signature(&self, doc: &Document, node: NodeId) -> bool {
        self.signature
            .is_some_and(|signature| doc.contains(signature, node))
    }
}

fn span_range(doc: &Document, nodes: &[NodeId]) -> Option<Range> {
    let (first, last) = (nodes.first()?, nodes.last()?);
    Some(Range::new(
        Point::new(*first, 0),
        Point::new(*last, doc.length(*last)),
    ))
}

/// One range over the children before the signature and one over those after
/// it; a single range over all children when there is no signature.
pub fn region_ranges(doc: &Document, regions: &FontRegions) -> Vec<Range> {
    let children = doc.children(regions.editing);
    let (before, after) = match regions
        .signature
        .and_then(|signature| children.iter().position(|child| *child == signature))
    {
        Some(ix) => (&children[..ix], &children[ix + 1..]),
        None => (&children[..], &children[children.len()..]),
    };
    [span_range(doc, before), span_range(doc, after)]
        .into_iter()
        .flatten()
        .collect()
}

/// True when every text node of the editing area outside the signature is
/// inside the range.
pub fn range_covers_region(doc: &Document, range: &Range, regions: &FontRegions) -> bool {
    let mut seen = false;
    for node in doc.descendants(regions.editing) {
        if !doc.is_text(node) || regions.in_signature(doc, node) {
            continue;
        }
        if !is_node_contained_in_range(doc, range, node, false) {
            return false;
        }
        seen = true;
    }
    seen
}

pub(crate) fn set_font_face_size(
    editor: &mut Editor,
    name: &str,
    size: &str,
    replace_all: bool,
    regions: FontRegions,
) -> Result<bool> {
    let root = editor.root;
    regions.validate(&editor.doc, root)?;
    let mut selection = editor.selection;
    editor.doc.validate_range(&selection, root)?;
    if !selection.is_collapsed() && range_does_start_at_block_boundary(&editor.doc, &selection, root) {
        selection = move_range_boundaries_up_tree(&editor.doc, &selection, Some(root), Some(root), root);
    }

    let covers_all = range_covers_region(&editor.doc, &selection, &regions);
    let mut ranges = if replace_all {
        region_ranges(&editor.doc, &regions)
    } else {
        Vec::new()
    };
    if ranges.is_empty() {
        ranges.push(selection);
    }
    let only_remove = replace_all || covers_all;
    debug!(name, size, replace_all, covers_all, ranges = ranges.len(), "setting font");

    let class_names = &editor.config.class_names;
    let size_spec = FormatSpec::new("SPAN").attr("class", class_names.font_size.as_str());
    let family_remove = FormatSpec::new("SPAN").attr("class", class_names.font_family.as_str());
    let family_add = (!only_remove).then(|| {
        family_remove
            .clone()
            .attr("style", format!("font-family: {name}; font-size: {size}"))
    });

    let results = for_each_range(&mut editor.doc, &ranges, |doc, range| {
        let range = change_format(doc, root, None, Some(&size_spec), &range, false)?;
        change_format(doc, root, family_add.as_ref(), Some(&family_remove), &range, false)
    })?;
    if let Some(last) = results.last() {
        editor.finish_format(*last)?;
    }
    Ok(only_remove)
}
