//! Immutable editor snapshots.
//!
//! An [`EditorState`] bundles the document content, the selection, and the
//! pending inline style override (the styles the next typed characters will
//! carry). Every edit produces a new snapshot via [`EditorState::push`];
//! snapshots are never modified in place.

use super::block::{ContentBlock, StyleSet};
use super::content::ContentState;
use super::selection::SelectionState;
use std::sync::Arc;

/// The kind of edit that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    InsertCharacters,
    BackspaceCharacter,
    DeleteCharacter,
    RemoveRange,
    SplitBlock,
    ChangeBlockType,
    ChangeInlineStyle,
}

/// A complete editor snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    content: Arc<ContentState>,
    selection: SelectionState,
    inline_style_override: Option<StyleSet>,
    last_change_type: Option<ChangeType>,
}

impl EditorState {
    /// Snapshot of an empty document with the caret at its start.
    pub fn create_empty() -> Self {
        Self::create_with_content(ContentState::create_empty())
    }

    /// Snapshot of `content` with the caret at the start of the first block.
    pub fn create_with_content(content: ContentState) -> Self {
        let selection = SelectionState::collapsed(content.first_block().key().clone(), 0);
        Self {
            content: Arc::new(content),
            selection,
            inline_style_override: None,
            last_change_type: None,
        }
    }

    pub fn content(&self) -> &ContentState {
        &self.content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn inline_style_override(&self) -> Option<&StyleSet> {
        self.inline_style_override.as_ref()
    }

    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.last_change_type
    }

    /// The block holding the selection.
    pub fn current_block(&self) -> &ContentBlock {
        self.content
            .block_for_key(self.selection.block_key())
            .unwrap_or_else(|| self.content.first_block())
    }

    /// Text of the current block from its start up to the selection start.
    pub fn text_before_selection(&self) -> &str {
        crate::string_utils::char_slice_to(
            self.current_block().text(),
            self.selection.start_offset(),
        )
    }

    /// Styles the next inserted characters will carry.
    ///
    /// The override wins when set. Otherwise a caret takes the style of the
    /// character before it (or the first character at offset 0), and a range
    /// takes the style of its first character.
    pub fn current_inline_style(&self) -> StyleSet {
        if let Some(style) = &self.inline_style_override {
            return style.clone();
        }
        let block = self.current_block();
        let start = self.selection.start_offset();
        if self.selection.is_collapsed() && start > 0 {
            block.style_at(start - 1)
        } else {
            block.style_at(start)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// New snapshot with `content` and `selection` after a change.
    ///
    /// Inserting characters consumes the inline style override; other
    /// changes keep it while the caret stays in the same block.
    pub fn push(&self, content: ContentState, selection: SelectionState, change: ChangeType) -> Self {
        let same_block = selection.block_key() == self.selection.block_key();
        let inline_style_override = match change {
            ChangeType::InsertCharacters | ChangeType::SplitBlock => None,
            _ if same_block => self.inline_style_override.clone(),
            _ => None,
        };
        let selection = clamp_selection(&content, selection);
        Self {
            content: Arc::new(content),
            selection,
            inline_style_override,
            last_change_type: Some(change),
        }
    }

    /// New snapshot with only the selection changed. Moving the caret
    /// drops the inline style override.
    pub fn with_selection(&self, selection: SelectionState) -> Self {
        let selection = clamp_selection(&self.content, selection);
        Self {
            content: Arc::clone(&self.content),
            selection,
            inline_style_override: None,
            last_change_type: self.last_change_type,
        }
    }

    /// New snapshot with the inline style override set.
    pub fn with_inline_style_override(&self, style: StyleSet) -> Self {
        Self {
            inline_style_override: Some(style),
            last_change_type: Some(ChangeType::ChangeInlineStyle),
            ..self.clone()
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::create_empty()
    }
}

/// Keep the selection inside an existing block and within its text.
fn clamp_selection(content: &ContentState, selection: SelectionState) -> SelectionState {
    match content.block_for_key(selection.block_key()) {
        Some(block) => selection.clamped(block.len()),
        None => SelectionState::collapsed(content.first_block().key().clone(), 0),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
