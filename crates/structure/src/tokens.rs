//! Opaque inline tokens.
//!
//! A token is an element of the configured tag carrying the token type
//! attribute. Formatting applied across a token must end up around it, not
//! inside it, and the caret skips over tokens that open a block.

use tracing::trace;

use crate::boundary::{
    move_range_boundaries_down_tree, range_does_start_at_block_boundary, start_block_of_range,
};
use crate::config::{ClassNames, TokenConfig};
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::navigate::{walk_next_block, walk_previous_block};
use crate::range::{Point, Range};

pub fn is_token(doc: &Document, node: NodeId, token: &TokenConfig) -> bool {
    doc.has_tag(node, &token.tag) && doc.attr(node, &token.type_attribute).is_some()
}

pub(crate) fn is_font_span(doc: &Document, node: NodeId, class_names: &ClassNames) -> bool {
    doc.has_tag(node, "SPAN") && doc.attr(node, "class") == Some(class_names.font_family.as_str())
}

/// Hoists a font span that landed inside `node` back outside it. When the
/// token already sits in an equivalent font span the inner one is dropped.
/// Returns whether the tree changed.
pub fn extract_format_outside_token(
    doc: &mut Document,
    node: NodeId,
    class_names: &ClassNames,
) -> Result<bool> {
    let Some(format) = doc.first_child(node) else {
        return Ok(false);
    };
    if !is_font_span(doc, format, class_names) || doc.child_count(format) != 1 {
        return Ok(false);
    }
    let Some(text) = doc.first_child(format).filter(|text| doc.is_text(*text)) else {
        return Ok(false);
    };

    let style = doc.attr(format, "style").map(str::to_ascii_lowercase);
    let already_wrapped = doc.parent(node).is_some_and(|parent| {
        is_font_span(doc, parent, class_names)
            && doc.attr(parent, "style").map(str::to_ascii_lowercase) == style
    });

    let wrapper = doc.clone_shallow(format);
    doc.replace_with(format, text)?;
    doc.remove(format);
    if already_wrapped {
        doc.remove(wrapper);
    } else {
        doc.replace_with(node, wrapper)?;
        doc.append_child(wrapper, node)?;
    }
    trace!(?node, already_wrapped, "moved font span outside token");
    Ok(true)
}

pub fn extract_formats_outside_tokens(
    doc: &mut Document,
    root: NodeId,
    token: &TokenConfig,
    class_names: &ClassNames,
) -> Result<usize> {
    let tokens: Vec<NodeId> = doc
        .descendants(root)
        .into_iter()
        .filter(|node| is_token(doc, *node, token))
        .collect();
    let mut changed = 0;
    for node in tokens {
        if extract_format_outside_token(doc, node, class_names)? {
            changed += 1;
        }
    }
    Ok(changed)
}

/// Caret target when an arrow key is pressed at the start of a block that
/// opens with a token: the start of the previous or next block.
pub fn move_past_token(
    doc: &Document,
    root: NodeId,
    token: &TokenConfig,
    range: &Range,
    up: bool,
) -> Option<Range> {
    if !range_does_start_at_block_boundary(doc, range, root) {
        return None;
    }
    let block = start_block_of_range(doc, range, root)?;
    let first = doc
        .children(block)
        .into_iter()
        .find(|child| !doc.text(*child).is_some_and(str::is_empty))?;
    if !is_token(doc, first, token) {
        return None;
    }
    let target = if up {
        walk_previous_block(doc, block, root)?
    } else {
        walk_next_block(doc, block, root)?
    };
    Some(move_range_boundaries_down_tree(
        doc,
        &Range::collapsed(Point::new(target, 0)),
    ))
}
