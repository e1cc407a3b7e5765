//! Markdown-style formatting for Draftpad
//!
//! Draftpad does not parse markdown documents. It recognizes a few
//! markdown markers while typing and turns them into rich formatting.
//!
//! # Example
//! ```ignore
//! use crate::markdown::shortcuts;
//!
//! if let Some(action) = shortcuts::detect_in_state(&state, " ") {
//!     state = shortcuts::apply_shortcut(&state, action);
//! }
//! ```

pub mod shortcuts;
