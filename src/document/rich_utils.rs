//! Snapshot-level editing commands.
//!
//! These compose the pure functions in `modifier` into operations on whole
//! [`EditorState`] snapshots, and provide the standard key-command table.
//! Every function returns a new snapshot or `None` when the command has no
//! effect at the current selection.

use super::block::{BlockType, InlineStyle};
use super::editor_state::{ChangeType, EditorState};
use super::modifier;
use super::selection::SelectionState;
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Key Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Named editing commands resolved from keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
    Backspace,
    BackspaceWord,
    Delete,
    SplitBlock,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveHome,
    MoveEnd,
    SelectLeft,
    SelectRight,
    SelectAllInBlock,
}

impl KeyCommand {
    /// Command name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Code => "code",
            Self::Strikethrough => "strikethrough",
            Self::Backspace => "backspace",
            Self::BackspaceWord => "backspace-word",
            Self::Delete => "delete",
            Self::SplitBlock => "split-block",
            Self::MoveLeft => "move-left",
            Self::MoveRight => "move-right",
            Self::MoveUp => "move-up",
            Self::MoveDown => "move-down",
            Self::MoveHome => "move-home",
            Self::MoveEnd => "move-end",
            Self::SelectLeft => "select-left",
            Self::SelectRight => "select-right",
            Self::SelectAllInBlock => "select-all",
        }
    }
}

/// Resolve a key command against the standard command table.
///
/// Returns `None` when the command does not apply (e.g. backspace at the
/// very start of the document), so the caller can report it unhandled.
pub fn handle_key_command(state: &EditorState, command: KeyCommand) -> Option<EditorState> {
    debug!("Resolving key command: {}", command.name());
    match command {
        KeyCommand::Bold => Some(toggle_inline_style(state, InlineStyle::Bold)),
        KeyCommand::Italic => Some(toggle_inline_style(state, InlineStyle::Italic)),
        KeyCommand::Underline => Some(toggle_inline_style(state, InlineStyle::Underline)),
        KeyCommand::Code => Some(toggle_inline_style(state, InlineStyle::Code)),
        KeyCommand::Strikethrough => Some(toggle_inline_style(state, InlineStyle::Strikethrough)),
        KeyCommand::Backspace => backspace(state),
        KeyCommand::BackspaceWord => backspace_word(state),
        KeyCommand::Delete => delete(state),
        KeyCommand::SplitBlock => split_block(state),
        KeyCommand::MoveLeft => move_horizontal(state, false, false),
        KeyCommand::MoveRight => move_horizontal(state, true, false),
        KeyCommand::SelectLeft => move_horizontal(state, false, true),
        KeyCommand::SelectRight => move_horizontal(state, true, true),
        KeyCommand::MoveUp => move_vertical(state, false),
        KeyCommand::MoveDown => move_vertical(state, true),
        KeyCommand::MoveHome => move_to(state, 0),
        KeyCommand::MoveEnd => move_to(state, state.current_block().len()),
        KeyCommand::SelectAllInBlock => {
            let block = state.current_block();
            let selection = SelectionState::range(block.key().clone(), 0, block.len());
            (selection != *state.selection()).then(|| state.with_selection(selection))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Style Toggles
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle an inline style.
///
/// With a collapsed caret this flips the style in the pending override so it
/// applies to the next typed characters. With a range it removes the style
/// if every selected character already has it, and adds it otherwise.
pub fn toggle_inline_style(state: &EditorState, style: InlineStyle) -> EditorState {
    let selection = state.selection();

    if selection.is_collapsed() {
        let mut current = state.current_inline_style();
        if !current.remove(&style) {
            current.insert(style);
        }
        return state.with_inline_style_override(current);
    }

    let block = state.current_block();
    let add = !block.range_has_style(selection.start_offset(), selection.end_offset(), style);
    match modifier::set_inline_style(state.content(), selection, style, add) {
        Some((content, selection)) => state.push(content, selection, ChangeType::ChangeInlineStyle),
        None => state.clone(),
    }
}

/// Toggle the current block's type: set `block_type`, or revert to
/// `unstyled` if the block already has it.
pub fn toggle_block_type(state: &EditorState, block_type: BlockType) -> EditorState {
    let target = if state.current_block().block_type() == block_type {
        BlockType::Unstyled
    } else {
        block_type
    };
    match modifier::set_block_type(state.content(), state.selection(), target) {
        Some((content, selection)) => state.push(content, selection, ChangeType::ChangeBlockType),
        None => state.clone(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Changes
// ─────────────────────────────────────────────────────────────────────────────

/// Insert `chars` at the selection, replacing any selected range. Inserted
/// characters carry the current inline style.
pub fn insert_characters(state: &EditorState, chars: &str) -> EditorState {
    let style = state.current_inline_style();
    match modifier::replace_text(state.content(), state.selection(), chars, &style) {
        Some((content, selection)) => state.push(content, selection, ChangeType::InsertCharacters),
        None => state.clone(),
    }
}

/// Remove the character before the caret, the selected range, or join the
/// block with the previous one when the caret is at its start.
pub fn backspace(state: &EditorState) -> Option<EditorState> {
    let selection = state.selection();
    if !selection.is_collapsed() {
        return remove_selection(state);
    }

    let offset = selection.focus_offset();
    if offset == 0 {
        let block = state.current_block();
        // An empty styled block reverts to unstyled before it is merged away.
        if block.block_type() != BlockType::Unstyled && block.is_empty() {
            return Some(toggle_block_type(state, block.block_type()));
        }
        let (content, selection) = modifier::join_with_previous(state.content(), selection)?;
        return Some(state.push(content, selection, ChangeType::BackspaceCharacter));
    }

    let range = SelectionState::range(selection.block_key().clone(), offset - 1, offset);
    let (content, selection) = modifier::remove_range(state.content(), &range)?;
    Some(state.push(content, selection, ChangeType::BackspaceCharacter))
}

/// Remove the word (and trailing whitespace) before the caret.
pub fn backspace_word(state: &EditorState) -> Option<EditorState> {
    let selection = state.selection();
    if !selection.is_collapsed() || selection.focus_offset() == 0 {
        return backspace(state);
    }

    let before: Vec<char> = state.text_before_selection().chars().collect();
    let mut start = before.len();
    while start > 0 && before[start - 1].is_whitespace() {
        start -= 1;
    }
    while start > 0 && !before[start - 1].is_whitespace() {
        start -= 1;
    }

    let range = SelectionState::range(selection.block_key().clone(), start, before.len());
    let (content, selection) = modifier::remove_range(state.content(), &range)?;
    Some(state.push(content, selection, ChangeType::BackspaceCharacter))
}

/// Remove the character after the caret, the selected range, or pull the
/// next block into this one when the caret is at the end.
pub fn delete(state: &EditorState) -> Option<EditorState> {
    let selection = state.selection();
    if !selection.is_collapsed() {
        return remove_selection(state);
    }

    let block = state.current_block();
    let offset = selection.focus_offset();
    if offset >= block.len() {
        let next = state.content().block_after(block.key())?;
        let at_next = SelectionState::collapsed(next.key().clone(), 0);
        let (content, selection) = modifier::join_with_previous(state.content(), &at_next)?;
        return Some(state.push(content, selection, ChangeType::DeleteCharacter));
    }

    let range = SelectionState::range(block.key().clone(), offset, offset + 1);
    let (content, _) = modifier::remove_range(state.content(), &range)?;
    Some(state.push(content, selection.clone(), ChangeType::DeleteCharacter))
}

/// Split the current block at the caret.
pub fn split_block(state: &EditorState) -> Option<EditorState> {
    let (content, selection) = modifier::split_block(state.content(), state.selection())?;
    Some(state.push(content, selection, ChangeType::SplitBlock))
}

fn remove_selection(state: &EditorState) -> Option<EditorState> {
    let (content, selection) = modifier::remove_range(state.content(), state.selection())?;
    Some(state.push(content, selection, ChangeType::RemoveRange))
}

// ─────────────────────────────────────────────────────────────────────────────
// Caret Movement
// ─────────────────────────────────────────────────────────────────────────────

fn move_to(state: &EditorState, offset: usize) -> Option<EditorState> {
    let selection = SelectionState::collapsed(state.selection().block_key().clone(), offset);
    (selection != *state.selection()).then(|| state.with_selection(selection))
}

fn move_horizontal(state: &EditorState, forward: bool, extend: bool) -> Option<EditorState> {
    let selection = state.selection();
    let block = state.current_block();
    let content = state.content();

    // Collapsing a range moves to its edge without stepping further.
    if !extend && !selection.is_collapsed() {
        let edge = if forward {
            selection.end_offset()
        } else {
            selection.start_offset()
        };
        return Some(state.with_selection(SelectionState::collapsed(block.key().clone(), edge)));
    }

    let focus = selection.focus_offset();
    let next = if forward {
        if focus < block.len() {
            selection.with_focus(focus + 1)
        } else if extend {
            return None;
        } else {
            let next = content.block_after(block.key())?;
            SelectionState::collapsed(next.key().clone(), 0)
        }
    } else if focus > 0 {
        selection.with_focus(focus - 1)
    } else if extend {
        return None;
    } else {
        let previous = content.block_before(block.key())?;
        SelectionState::collapsed(previous.key().clone(), previous.len())
    };

    let next = if extend {
        next
    } else {
        SelectionState::collapsed(next.block_key().clone(), next.focus_offset())
    };
    Some(state.with_selection(next))
}

fn move_vertical(state: &EditorState, down: bool) -> Option<EditorState> {
    let key = state.selection().block_key();
    let target = if down {
        state.content().block_after(key)?
    } else {
        state.content().block_before(key)?
    };
    let offset = state.selection().focus_offset().min(target.len());
    Some(state.with_selection(SelectionState::collapsed(target.key().clone(), offset)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::block::{BlockKey, ContentBlock, StyleSet};
    use crate::document::content::ContentState;

    fn state(blocks: &[(&str, &str)], key: &str, caret: usize) -> EditorState {
        let content = ContentState::from_blocks(
            blocks
                .iter()
                .map(|(k, t)| ContentBlock::with_text(BlockKey::new(*k), BlockType::Unstyled, *t))
                .collect(),
        )
        .unwrap();
        EditorState::create_with_content(content)
            .with_selection(SelectionState::collapsed(BlockKey::new(key), caret))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Style toggle tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_toggle_inline_style_collapsed_sets_override() {
        let s = state(&[("a", "")], "a", 0);
        let s = toggle_inline_style(&s, InlineStyle::Bold);
        assert_eq!(s.inline_style_override(), Some(&StyleSet::from([InlineStyle::Bold])));

        let s = toggle_inline_style(&s, InlineStyle::Bold);
        assert_eq!(s.inline_style_override(), Some(&StyleSet::new()));
    }

    #[test]
    fn test_toggle_inline_style_range() {
        let s = state(&[("a", "hello")], "a", 0)
            .with_selection(SelectionState::range(BlockKey::new("a"), 0, 5));
        let s = toggle_inline_style(&s, InlineStyle::Italic);
        assert!(s.current_block().range_has_style(0, 5, InlineStyle::Italic));

        let s = toggle_inline_style(&s, InlineStyle::Italic);
        assert!(!s.current_block().range_has_style(0, 1, InlineStyle::Italic));
    }

    #[test]
    fn test_toggle_block_type_round_trip() {
        let s = state(&[("a", "Title")], "a", 0);
        let s = toggle_block_type(&s, BlockType::HeaderOne);
        assert_eq!(s.current_block().block_type(), BlockType::HeaderOne);
        let s = toggle_block_type(&s, BlockType::HeaderOne);
        assert_eq!(s.current_block().block_type(), BlockType::Unstyled);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text change tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_uses_override_then_inherits() {
        let s = state(&[("a", "")], "a", 0);
        let s = toggle_inline_style(&s, InlineStyle::Red);
        let s = insert_characters(&s, "x");
        assert!(s.inline_style_override().is_none());
        let s = insert_characters(&s, "y");
        assert_eq!(s.current_block().text(), "xy");
        assert!(s.current_block().range_has_style(0, 2, InlineStyle::Red));
        assert_eq!(s.selection().focus_offset(), 2);
    }

    #[test]
    fn test_backspace() {
        let s = state(&[("a", "abc")], "a", 3);
        let s = backspace(&s).unwrap();
        assert_eq!(s.current_block().text(), "ab");
        assert_eq!(s.selection().focus_offset(), 2);

        let start = state(&[("a", "abc")], "a", 0);
        assert!(backspace(&start).is_none());
    }

    #[test]
    fn test_backspace_joins_blocks() {
        let s = state(&[("a", "one"), ("b", "two")], "b", 0);
        let s = backspace(&s).unwrap();
        assert_eq!(s.content().plain_text(), "onetwo");
        assert_eq!(s.selection().focus_offset(), 3);
    }

    #[test]
    fn test_backspace_resets_empty_header() {
        let s = toggle_block_type(&state(&[("a", "x"), ("b", "")], "b", 0), BlockType::HeaderOne);
        let s = backspace(&s).unwrap();
        assert_eq!(s.current_block().block_type(), BlockType::Unstyled);
        assert_eq!(s.content().blocks().len(), 2);
    }

    #[test]
    fn test_backspace_word() {
        let s = state(&[("a", "hello big world")], "a", 15);
        let s = backspace_word(&s).unwrap();
        assert_eq!(s.current_block().text(), "hello big ");
        let s = backspace_word(&s).unwrap();
        assert_eq!(s.current_block().text(), "hello ");
    }

    #[test]
    fn test_delete() {
        let s = state(&[("a", "abc"), ("b", "def")], "a", 1);
        let s = delete(&s).unwrap();
        assert_eq!(s.current_block().text(), "ac");
        assert_eq!(s.selection().focus_offset(), 1);

        let end = state(&[("a", "abc"), ("b", "def")], "a", 3);
        let joined = delete(&end).unwrap();
        assert_eq!(joined.content().plain_text(), "abcdef");

        let last = state(&[("a", "abc")], "a", 3);
        assert!(delete(&last).is_none());
    }

    #[test]
    fn test_split_block_clears_override() {
        let s = toggle_inline_style(&state(&[("a", "ab")], "a", 1), InlineStyle::Bold);
        let s = split_block(&s).unwrap();
        assert_eq!(s.content().plain_text(), "a\nb");
        assert!(s.inline_style_override().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Movement tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_move_across_blocks() {
        let s = state(&[("a", "ab"), ("b", "cd")], "a", 2);
        let s = handle_key_command(&s, KeyCommand::MoveRight).unwrap();
        assert_eq!(s.selection().block_key().as_str(), "b");
        assert_eq!(s.selection().focus_offset(), 0);

        let s = handle_key_command(&s, KeyCommand::MoveLeft).unwrap();
        assert_eq!(s.selection().block_key().as_str(), "a");
        assert_eq!(s.selection().focus_offset(), 2);
    }

    #[test]
    fn test_move_at_document_edges_is_unhandled() {
        let s = state(&[("a", "ab")], "a", 0);
        assert!(handle_key_command(&s, KeyCommand::MoveLeft).is_none());
        assert!(handle_key_command(&s, KeyCommand::MoveUp).is_none());
        assert!(handle_key_command(&s, KeyCommand::MoveHome).is_none());
    }

    #[test]
    fn test_select_and_collapse() {
        let s = state(&[("a", "abc")], "a", 1);
        let s = handle_key_command(&s, KeyCommand::SelectRight).unwrap();
        let s = handle_key_command(&s, KeyCommand::SelectRight).unwrap();
        assert_eq!(s.selection().start_offset(), 1);
        assert_eq!(s.selection().end_offset(), 3);

        let s = handle_key_command(&s, KeyCommand::MoveLeft).unwrap();
        assert!(s.selection().is_collapsed());
        assert_eq!(s.selection().focus_offset(), 1);
    }

    #[test]
    fn test_move_vertical_clamps_offset() {
        let s = state(&[("a", "a long line"), ("b", "ab")], "a", 8);
        let s = handle_key_command(&s, KeyCommand::MoveDown).unwrap();
        assert_eq!(s.selection().block_key().as_str(), "b");
        assert_eq!(s.selection().focus_offset(), 2);
    }
}
