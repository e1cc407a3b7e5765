//! Rich Text Document Model
//!
//! A small rich-text engine: immutable snapshots of block-structured
//! content with per-character inline styles, a single-block selection, pure
//! modifier functions, and the standard key-command table.
//!
//! # Usage
//! ```ignore
//! use crate::document::{rich_utils, EditorState, InlineStyle};
//!
//! let state = EditorState::create_empty();
//! let state = rich_utils::toggle_inline_style(&state, InlineStyle::Bold);
//! let state = rich_utils::insert_characters(&state, "bold text");
//! ```

mod block;
mod content;
mod editor_state;
pub mod modifier;
pub mod raw;
pub mod rich_utils;
mod selection;

pub use block::{BlockKey, BlockType, ContentBlock, InlineStyle, StyleSet};
pub use content::ContentState;
pub use editor_state::{ChangeType, EditorState};
pub use raw::{convert_from_raw, convert_to_raw, RawContentState};
pub use rich_utils::KeyCommand;
pub use selection::SelectionState;
