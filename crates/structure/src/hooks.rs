use tracing::debug;

use crate::config::EditorConfig;
use crate::dom::{Document, NodeId};
use crate::editor::Editor;
use crate::error::Result;
use crate::format::merge_inlines;
use crate::keyboard::{InputEvent, KeyOutcome};
use crate::range::Range;
use crate::tokens::extract_formats_outside_tokens;

/// Deployment-specific behaviour layered over the engine.
pub trait HostHooks: Send + Sync {
    fn id(&self) -> &'static str;

    /// Deployment defaults, applied before host overrides.
    fn make_config(&self, base: EditorConfig) -> EditorConfig {
        base
    }

    /// Sees input events before the engine. `Some` claims the event.
    fn before_input(&self, _editor: &mut Editor, _event: &InputEvent) -> Result<Option<KeyOutcome>> {
        Ok(None)
    }

    fn after_format(
        &self,
        _doc: &mut Document,
        _root: NodeId,
        _config: &EditorConfig,
        range: Range,
    ) -> Result<Range> {
        Ok(range)
    }
}

pub struct DefaultHooks;

impl HostHooks for DefaultHooks {
    fn id(&self) -> &'static str {
        "default"
    }
}

/// Hooks for documents carrying opaque inline tokens.
pub struct TokenHooks;

fn last_word_has_slash(text: &str) -> bool {
    text.split(' ').next_back().is_some_and(|word| word.contains('/'))
}

impl HostHooks for TokenHooks {
    fn id(&self) -> &'static str {
        "tokens"
    }

    fn make_config(&self, base: EditorConfig) -> EditorConfig {
        let token = base.token.clone().unwrap_or_default();
        base.with_avoid_slashy_replacements(true).with_token(token)
    }

    fn before_input(&self, editor: &mut Editor, event: &InputEvent) -> Result<Option<KeyOutcome>> {
        if *event != InputEvent::InsertParagraph || !editor.config().avoid_slashy_replacements {
            return Ok(None);
        }
        let range = editor.selection();
        if range.is_collapsed()
            && let Some(text) = editor.doc().text(range.end.node)
            && last_word_has_slash(text)
        {
            debug!("leaving paragraph insertion after a slashed word to the host");
            return Ok(Some(KeyOutcome::default()));
        }
        editor.split_block(false)?;
        Ok(Some(KeyOutcome::prevented()))
    }

    fn after_format(
        &self,
        doc: &mut Document,
        root: NodeId,
        config: &EditorConfig,
        range: Range,
    ) -> Result<Range> {
        let mut range = range;
        if let Some(token) = &config.token
            && extract_formats_outside_tokens(doc, root, token, &config.class_names)? > 0
        {
            merge_inlines(doc, root, &mut range)?;
        }
        Ok(range)
    }
}
