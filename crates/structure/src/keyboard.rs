use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::{range_does_start_at_block_boundary, start_block_of_range};
use crate::category::is_list_tag;
use crate::editor::Editor;
use crate::error::Result;
use crate::list::create_list_from_marker;
use crate::navigate::{AncestorScope, nearest_ancestor, nearest_with_tag};
use crate::tokens::move_past_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Tab,
    ArrowUp,
    ArrowDown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    #[serde(default)]
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub fn prevented() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    InsertParagraph,
    InsertLineBreak,
    InsertText(String),
    InsertOrderedList,
    InsertUnorderedList,
    FormatBold,
    FormatItalic,
    FormatUnderline,
    FormatIndent,
    FormatOutdent,
    Other(String),
}

/// Tab nests a list item when the caret opens it, then tries to turn a typed
/// marker into a list, and otherwise inserts the configured tab text.
pub(crate) fn tab(editor: &mut Editor) -> Result<KeyOutcome> {
    editor.remove_zws()?;
    let range = editor.selection;
    let root = editor.root;

    let mut outcome = KeyOutcome::default();
    let mut insert_tab = true;
    if range.is_collapsed()
        && range_does_start_at_block_boundary(&editor.doc, &range, root)
        && let Some(block) = start_block_of_range(&editor.doc, &range, root)
        && nearest_ancestor(&editor.doc, block, root, AncestorScope::STRICT, |doc, node| {
            doc.tag(node).is_some_and(is_list_tag)
        })?
        .is_some()
    {
        debug!("tab at start of list item");
        outcome.prevent_default = true;
        insert_tab = false;
        editor.increase_list_level()?;
    }

    if let Some(caret) = create_list_from_marker(&mut editor.doc, root, &editor.config, &editor.selection)? {
        editor.selection = caret;
        return Ok(KeyOutcome::prevented());
    }

    if insert_tab {
        let text = editor.config.tab_text.clone();
        editor.insert_plain_text(&text)?;
        outcome.prevent_default = true;
    }
    Ok(outcome)
}

/// Shift+Tab only acts on a collapsed caret at the start of a block inside a
/// list, where it moves the item up one level.
pub(crate) fn shift_tab(editor: &mut Editor) -> Result<KeyOutcome> {
    let range = editor.selection;
    let root = editor.root;
    if !range.is_collapsed() || !range_does_start_at_block_boundary(&editor.doc, &range, root) {
        return Ok(KeyOutcome::default());
    }
    let node = range.start.node;
    if nearest_with_tag(&editor.doc, node, root, "UL", None)?.is_none()
        && nearest_with_tag(&editor.doc, node, root, "OL", None)?.is_none()
    {
        return Ok(KeyOutcome::default());
    }
    debug!("shift+tab at start of list item");
    editor.remove_zws()?;
    editor.decrease_list_level()?;
    Ok(KeyOutcome::prevented())
}

pub(crate) fn arrow(editor: &mut Editor, up: bool) -> Result<KeyOutcome> {
    let Some(token) = editor.config.token.as_ref() else {
        return Ok(KeyOutcome::default());
    };
    match move_past_token(&editor.doc, editor.root, token, &editor.selection, up) {
        Some(caret) => {
            editor.selection = caret;
            Ok(KeyOutcome::prevented())
        }
        None => Ok(KeyOutcome::default()),
    }
}
