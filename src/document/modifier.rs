//! Pure content transformations.
//!
//! Each function takes a `ContentState` and a selection and returns the new
//! content together with the selection that should follow the change. None
//! of them touch the editor snapshot; `rich_utils` composes them into
//! snapshot-level commands.

use super::block::{BlockType, InlineStyle, StyleSet};
use super::content::ContentState;
use super::selection::SelectionState;
use crate::string_utils::char_count;

/// Content plus the selection after a modification.
pub type Modified = (ContentState, SelectionState);

/// Replace the selected range with `text`, styled with `style`.
///
/// The caret ends up collapsed after the inserted text. Returns `None` if
/// the selection's block does not exist.
pub fn replace_text(
    content: &ContentState,
    selection: &SelectionState,
    text: &str,
    style: &StyleSet,
) -> Option<Modified> {
    let block = content.block_for_key(selection.block_key())?;
    let start = selection.start_offset().min(block.len());
    let end = selection.end_offset().min(block.len());

    let updated = block.with_replaced_range(start, end, text, style);
    let caret = SelectionState::collapsed(block.key().clone(), start + char_count(text));
    Some((content.with_block(updated), caret))
}

/// Remove the selected range, leaving the caret at its start.
pub fn remove_range(content: &ContentState, selection: &SelectionState) -> Option<Modified> {
    replace_text(content, selection, "", &StyleSet::new())
}

/// Add or remove `style` over the selected range. The selection is kept.
pub fn set_inline_style(
    content: &ContentState,
    selection: &SelectionState,
    style: InlineStyle,
    add: bool,
) -> Option<Modified> {
    let block = content.block_for_key(selection.block_key())?;
    let updated =
        block.with_style_in_range(selection.start_offset(), selection.end_offset(), style, add);
    Some((content.with_block(updated), selection.clone()))
}

/// Set the type of the selection's block. The selection is kept.
pub fn set_block_type(
    content: &ContentState,
    selection: &SelectionState,
    block_type: BlockType,
) -> Option<Modified> {
    let block = content.block_for_key(selection.block_key())?;
    let updated = block.with_block_type(block_type);
    Some((content.with_block(updated), selection.clone()))
}

/// Split the selection's block at the caret (removing any selected range
/// first). The caret moves to the start of the new block.
pub fn split_block(content: &ContentState, selection: &SelectionState) -> Option<Modified> {
    let (content, caret) = if selection.is_collapsed() {
        (content.clone(), selection.clone())
    } else {
        remove_range(content, selection)?
    };

    let block = content.block_for_key(caret.block_key())?;
    let new_key = content.generate_key();
    let (head, tail) = block.split_at(caret.focus_offset(), new_key.clone());
    let content = content.with_block_replaced_by(caret.block_key(), vec![head, tail])?;
    Some((content, SelectionState::collapsed(new_key, 0)))
}

/// Merge the selection's block into the block before it. The caret lands
/// at the join point. Returns `None` for the first block.
pub fn join_with_previous(content: &ContentState, selection: &SelectionState) -> Option<Modified> {
    let block = content.block_for_key(selection.block_key())?;
    let previous = content.block_before(selection.block_key())?;
    let caret = SelectionState::collapsed(previous.key().clone(), previous.len());

    let merged = previous.joined_with(block);
    let content = content.with_block(merged).without_block(block.key());
    Some((content, caret))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
