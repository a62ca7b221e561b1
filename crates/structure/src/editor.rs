use std::sync::Arc;

use tracing::debug;

use crate::bookmark::Bookmark;
use crate::boundary::move_range_boundaries_down_tree;
use crate::config::{ConfigOverrides, EditorConfig};
use crate::dom::{Document, NodeId, ZWS};
use crate::error::{EditError, Result};
use crate::fonts::{self, FontRegions};
use crate::format::{self, FormatSpec};
use crate::hooks::{DefaultHooks, HostHooks};
use crate::keyboard::{self, InputEvent, Key, KeyOutcome, KeyPress};
use crate::list::{self, ListKind};
use crate::range::{Point, Range};
use crate::split::{self, delete_contents_of_range, insert_text_at};
use crate::value::Node;

/// Editing session over one root element of a document.
pub struct Editor {
    pub(crate) doc: Document,
    pub(crate) root: NodeId,
    pub(crate) selection: Range,
    pub(crate) config: EditorConfig,
    pub(crate) hooks: Arc<dyn HostHooks>,
}

impl Editor {
    pub fn new(
        doc: Document,
        root: NodeId,
        hooks: Arc<dyn HostHooks>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        doc.ensure_alive(root)?;
        if !doc.is_element(root) {
            return Err(EditError::NotAnElement(root));
        }
        let config = EditorConfig::resolve(hooks.as_ref(), overrides)?;
        let selection = move_range_boundaries_down_tree(&doc, &Range::collapsed(Point::new(root, 0)));
        debug!(hooks = hooks.id(), block_tag = %config.block_tag, "editor created");
        Ok(Self {
            doc,
            root,
            selection,
            config,
            hooks,
        })
    }

    pub fn with_defaults(doc: Document) -> Self {
        let root = doc.body();
        let selection = move_range_boundaries_down_tree(&doc, &Range::collapsed(Point::new(root, 0)));
        Self {
            doc,
            root,
            selection,
            config: EditorConfig::default(),
            hooks: Arc::new(DefaultHooks),
        }
    }

    pub fn from_nodes(nodes: &[Node]) -> Self {
        Self::with_defaults(Document::from_nodes(nodes))
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Range {
        self.selection
    }

    pub fn set_selection(&mut self, range: Range) -> Result<()> {
        self.doc.validate_range(&range, self.root)?;
        self.selection = range;
        Ok(())
    }

    pub fn value(&self) -> Vec<Node> {
        self.doc.children_to_nodes(self.root)
    }

    pub(crate) fn finish_format(&mut self, range: Range) -> Result<()> {
        let hooks = Arc::clone(&self.hooks);
        self.selection = hooks.after_format(&mut self.doc, self.root, &self.config, range)?;
        Ok(())
    }

    // Formatting.

    pub fn change_format(
        &mut self,
        add: Option<&FormatSpec>,
        remove: Option<&FormatSpec>,
        partial: bool,
    ) -> Result<()> {
        let range = self.selection;
        self.change_format_in(add, remove, range, partial)
    }

    pub fn change_format_in(
        &mut self,
        add: Option<&FormatSpec>,
        remove: Option<&FormatSpec>,
        range: Range,
        partial: bool,
    ) -> Result<()> {
        let range = format::change_format(&mut self.doc, self.root, add, remove, &range, partial)?;
        self.finish_format(range)
    }

    /// Applies the same change to every range; the selection ends on the last.
    pub fn change_format_across(
        &mut self,
        add: Option<&FormatSpec>,
        remove: Option<&FormatSpec>,
        ranges: &[Range],
        partial: bool,
    ) -> Result<()> {
        let results =
            format::change_format_across(&mut self.doc, self.root, add, remove, ranges, partial)?;
        match results.last() {
            Some(last) => self.finish_format(*last),
            None => Ok(()),
        }
    }

    pub fn has_format(&self, spec: &FormatSpec) -> bool {
        format::has_format(&self.doc, self.root, spec, &self.selection)
    }

    /// Removes the format when the whole selection has it, adds it otherwise.
    pub fn toggle_format(&mut self, spec: &FormatSpec) -> Result<()> {
        if self.has_format(spec) {
            self.change_format(None, Some(spec), true)
        } else {
            self.change_format(Some(spec), None, true)
        }
    }

    pub fn set_font_face_size(
        &mut self,
        name: &str,
        size: &str,
        replace_all: bool,
        regions: FontRegions,
    ) -> Result<bool> {
        fonts::set_font_face_size(self, name, size, replace_all, regions)
    }

    // Structure.

    pub fn remove_zws(&mut self) -> Result<()> {
        if !self.doc.text_content(self.root).contains(ZWS) {
            return Ok(());
        }
        let bookmark = Bookmark::save(&mut self.doc, &self.selection)?;
        format::remove_zws(&mut self.doc, self.root, None)?;
        self.selection = bookmark.restore(&mut self.doc)?;
        Ok(())
    }

    pub fn split_block(&mut self, line_break_only: bool) -> Result<()> {
        self.doc.validate_range(&self.selection, self.root)?;
        self.remove_zws()?;
        let caret = split::split_block(
            &mut self.doc,
            self.root,
            &self.config,
            &self.selection,
            line_break_only,
        )?;
        self.selection = move_range_boundaries_down_tree(&self.doc, &caret);
        Ok(())
    }

    /// Rebuilds `container` around the selection; see [`split::split_document`].
    pub fn split_document(&mut self, container: Option<NodeId>) -> Result<Option<NodeId>> {
        let after = split::split_document(
            &mut self.doc,
            &self.selection,
            container,
            &self.config.block_tag,
        )?;
        if let Some(node) = after {
            self.selection =
                move_range_boundaries_down_tree(&self.doc, &Range::collapsed(Point::new(node, 0)));
        }
        Ok(after)
    }

    pub fn increase_list_level(&mut self) -> Result<bool> {
        self.doc.validate_range(&self.selection, self.root)?;
        list::increase_list_level(&mut self.doc, self.root, &self.config, &self.selection)
    }

    pub fn decrease_list_level(&mut self) -> Result<bool> {
        self.doc.validate_range(&self.selection, self.root)?;
        list::decrease_list_level(&mut self.doc, self.root, &self.config, &self.selection)
    }

    pub fn make_list(&mut self, kind: ListKind) -> Result<()> {
        self.doc.validate_range(&self.selection, self.root)?;
        list::make_list(&mut self.doc, self.root, &self.config, &self.selection, kind)?;
        Ok(())
    }

    /// Replaces the selection with `text`; newlines start new blocks.
    pub fn insert_plain_text(&mut self, text: &str) -> Result<()> {
        self.doc.validate_range(&self.selection, self.root)?;
        if !self.selection.is_collapsed() {
            self.selection =
                delete_contents_of_range(&mut self.doc, self.root, &self.config.block_tag, &self.selection)?;
        }
        for (ix, line) in text.split('\n').enumerate() {
            if ix > 0 {
                self.split_block(false)?;
            }
            if line.is_empty() {
                continue;
            }
            let caret = move_range_boundaries_down_tree(&self.doc, &self.selection).start;
            let caret = insert_text_at(&mut self.doc, caret, line)?;
            self.selection = Range::collapsed(caret);
        }
        Ok(())
    }

    // Input.

    pub fn handle_key(&mut self, key: &KeyPress) -> Result<KeyOutcome> {
        self.doc.validate_range(&self.selection, self.root)?;
        match (key.key, key.shift) {
            (Key::Tab, false) => keyboard::tab(self),
            (Key::Tab, true) => keyboard::shift_tab(self),
            (Key::ArrowUp, _) => keyboard::arrow(self, true),
            (Key::ArrowDown, _) => keyboard::arrow(self, false),
            (Key::Other, _) => Ok(KeyOutcome::default()),
        }
    }

    /// Offers the event to the host hooks first, then applies the default.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<KeyOutcome> {
        self.doc.validate_range(&self.selection, self.root)?;
        let hooks = Arc::clone(&self.hooks);
        if let Some(outcome) = hooks.before_input(self, event)? {
            return Ok(outcome);
        }
        match event {
            InputEvent::InsertParagraph => self.split_block(false)?,
            InputEvent::InsertLineBreak => self.split_block(true)?,
            InputEvent::InsertText(text) => self.insert_plain_text(text)?,
            InputEvent::InsertOrderedList => self.make_list(ListKind::Ordered)?,
            InputEvent::InsertUnorderedList => self.make_list(ListKind::Unordered)?,
            InputEvent::FormatBold => self.toggle_format(&FormatSpec::new("B"))?,
            InputEvent::FormatItalic => self.toggle_format(&FormatSpec::new("I"))?,
            InputEvent::FormatUnderline => self.toggle_format(&FormatSpec::new("U"))?,
            InputEvent::FormatIndent => {
                self.increase_list_level()?;
            }
            InputEvent::FormatOutdent => {
                self.decrease_list_level()?;
            }
            InputEvent::Other(_) => return Ok(KeyOutcome::default()),
        }
        Ok(KeyOutcome::prevented())
    }
}
