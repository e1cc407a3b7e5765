//! Keyboard input translation for the editor surface.
//!
//! Raw egui events are mapped to either a [`KeyCommand`] for the engine's
//! command table or a run of typed text. Application-level shortcuts such
//! as Ctrl+S are not mapped here and pass through untouched.

use crate::document::KeyCommand;
use eframe::egui::{Event, InputState, Key, Modifiers};

/// One editor input, in the order it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInput {
    /// A named editing command
    Command(KeyCommand),
    /// Characters typed by the user
    Text(String),
}

/// Collect this frame's editor inputs.
pub fn collect_inputs(input: &InputState) -> Vec<EditorInput> {
    input.events.iter().filter_map(map_event).collect()
}

/// Map a single egui event to an editor input.
pub fn map_event(event: &Event) -> Option<EditorInput> {
    match event {
        Event::Text(text) if !text.is_empty() => Some(EditorInput::Text(text.clone())),
        Event::Paste(text) if !text.is_empty() => {
            // Blocks are split by commands, not by embedded newlines.
            let flattened = text.replace(['\r', '\n'], " ");
            Some(EditorInput::Text(flattened))
        }
        Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => map_key(*key, *modifiers).map(EditorInput::Command),
        _ => None,
    }
}

/// Resolve a key press to a command.
pub fn map_key(key: Key, modifiers: Modifiers) -> Option<KeyCommand> {
    let command = modifiers.command;
    let shift = modifiers.shift;
    let word = command || modifiers.alt;

    let resolved = match key {
        Key::B if command && !shift => KeyCommand::Bold,
        Key::I if command && !shift => KeyCommand::Italic,
        Key::U if command && !shift => KeyCommand::Underline,
        Key::J if command && !shift => KeyCommand::Code,
        Key::X if command && shift => KeyCommand::Strikethrough,
        Key::A if command && !shift => KeyCommand::SelectAllInBlock,

        Key::Backspace if word => KeyCommand::BackspaceWord,
        Key::Backspace => KeyCommand::Backspace,
        Key::Delete if !command => KeyCommand::Delete,
        Key::Enter if !command => KeyCommand::SplitBlock,

        Key::ArrowLeft if shift && !command => KeyCommand::SelectLeft,
        Key::ArrowRight if shift && !command => KeyCommand::SelectRight,
        Key::ArrowLeft if !command => KeyCommand::MoveLeft,
        Key::ArrowRight if !command => KeyCommand::MoveRight,
        Key::ArrowUp if !command => KeyCommand::MoveUp,
        Key::ArrowDown if !command => KeyCommand::MoveDown,
        Key::Home => KeyCommand::MoveHome,
        Key::End => KeyCommand::MoveEnd,

        _ => return None,
    };
    Some(resolved)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
