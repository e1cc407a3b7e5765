//! Markdown-style typing shortcuts
//!
//! Typing a short marker at the start of a line and then a space formats
//! the line instead of inserting the marker:
//!
//! | marker | action                      |
//! |--------|-----------------------------|
//! | `#`    | block becomes `header-one`  |
//! | `*`    | toggle bold                 |
//! | `**`   | toggle the red style        |
//! | `***`  | toggle underline            |
//!
//! The marker is erased and the space is swallowed. Markers made of `*` and
//! `#` that are not in the table (`##`, `#*`, `****`) do nothing and the
//! space is typed as usual.
//!
//! # Usage
//! ```ignore
//! use crate::markdown::shortcuts::{apply_shortcut, detect};
//!
//! if let Some(action) = detect(state.text_before_selection(), " ") {
//!     let next = apply_shortcut(&state, action);
//! }
//! ```

use crate::document::modifier;
use crate::document::rich_utils::{toggle_block_type, toggle_inline_style};
use crate::document::{BlockType, ChangeType, EditorState, InlineStyle, SelectionState};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Actions and Trigger Table
// ─────────────────────────────────────────────────────────────────────────────

/// Formatting applied when a shortcut fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Toggle the current block's type
    BlockType(BlockType),
    /// Toggle an inline style for the text typed next
    InlineStyle(InlineStyle),
}

/// A marker and the action it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerPattern {
    pub marker: &'static str,
    pub action: ShortcutAction,
}

/// All recognized shortcut markers.
pub const TRIGGER_PATTERNS: &[TriggerPattern] = &[
    TriggerPattern {
        marker: "#",
        action: ShortcutAction::BlockType(BlockType::HeaderOne),
    },
    TriggerPattern {
        marker: "*",
        action: ShortcutAction::InlineStyle(InlineStyle::Bold),
    },
    TriggerPattern {
        marker: "**",
        action: ShortcutAction::InlineStyle(InlineStyle::Red),
    },
    TriggerPattern {
        marker: "***",
        action: ShortcutAction::InlineStyle(InlineStyle::Underline),
    },
];

/// Character typed to fire a shortcut.
const TRIGGER_CHAR: &str = " ";

/// Markers consist only of `*` and `#`.
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^[*#]+$").expect("marker pattern is valid"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Decide whether typing `typed` after `preceding_text` fires a shortcut.
///
/// `preceding_text` is the current block's text from its start up to the
/// caret, before `typed` is inserted.
pub fn detect(preceding_text: &str, typed: &str) -> Option<ShortcutAction> {
    if typed != TRIGGER_CHAR || !marker_regex().is_match(preceding_text) {
        return None;
    }

    let action = TRIGGER_PATTERNS
        .iter()
        .find(|pattern| pattern.marker == preceding_text)
        .map(|pattern| pattern.action);

    if action.is_none() {
        debug!("Marker '{}' has no shortcut, typing space", preceding_text);
    }
    action
}

/// Detect a shortcut at the snapshot's selection. The marker is the text
/// before the selection start, so a range selected right after a marker
/// fires too and the formatting applies to that range.
pub fn detect_in_state(state: &EditorState, typed: &str) -> Option<ShortcutAction> {
    detect(state.text_before_selection(), typed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Transformation
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a fired shortcut: toggle the formatting on the current snapshot,
/// then erase the marker `[0, start)` from the current block.
///
/// The inline style override set by the toggle survives the erasure, so
/// the next typed characters carry the style. A selected range stays
/// selected, shifted left by the marker length.
pub fn apply_shortcut(state: &EditorState, action: ShortcutAction) -> EditorState {
    let formatted = match action {
        ShortcutAction::BlockType(block_type) => toggle_block_type(state, block_type),
        ShortcutAction::InlineStyle(style) => toggle_inline_style(state, style),
    };
    erase_marker(&formatted)
}

fn erase_marker(state: &EditorState) -> EditorState {
    let selection = state.selection();
    let start = selection.start_offset();
    let marker = SelectionState::range(selection.block_key().clone(), 0, start);
    match modifier::remove_range(state.content(), &marker) {
        Some((content, caret)) if selection.is_collapsed() => {
            state.push(content, caret, ChangeType::RemoveRange)
        }
        Some((content, _)) => {
            let shifted = SelectionState::range(
                selection.block_key().clone(),
                selection.anchor_offset() - start,
                selection.focus_offset() - start,
            );
            state.push(content, shifted, ChangeType::RemoveRange)
        }
        None => state.clone(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
