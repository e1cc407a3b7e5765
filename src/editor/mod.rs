//! Editor module for Draftpad
//!
//! This module contains the rich text editing surface and the mapping from
//! keyboard events to editing commands.

mod input;
mod widget;

pub use widget::EditorWidget;
