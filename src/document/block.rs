//! Blocks, block types, and inline styles.
//!
//! A [`ContentBlock`] is one paragraph of the document. Its text is stored as
//! a `String` alongside one [`StyleSet`] per character, so every character
//! carries the exact set of inline styles applied to it.

use crate::string_utils::{char_count, char_slice_from, char_slice_to, replace_char_range};
use std::collections::BTreeSet;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Inline Styles
// ─────────────────────────────────────────────────────────────────────────────

/// Character-range-scoped visual attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Code,
    Strikethrough,
    /// Custom red foreground style
    Red,
}

impl InlineStyle {
    /// Every style, in serialization order.
    pub const ALL: [InlineStyle; 6] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Code,
        InlineStyle::Strikethrough,
        InlineStyle::Red,
    ];

    /// Name used in the persisted document.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "BOLD",
            Self::Italic => "ITALIC",
            Self::Underline => "UNDERLINE",
            Self::Code => "CODE",
            Self::Strikethrough => "STRIKETHROUGH",
            Self::Red => "RED",
        }
    }

    /// Parse a persisted style name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of inline styles applied to one character.
pub type StyleSet = BTreeSet<InlineStyle>;

// ─────────────────────────────────────────────────────────────────────────────
// Block Types
// ─────────────────────────────────────────────────────────────────────────────

/// Paragraph-level type tag of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    #[default]
    Unstyled,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    Blockquote,
    UnorderedListItem,
    OrderedListItem,
    CodeBlock,
}

impl BlockType {
    const ALL: [BlockType; 11] = [
        BlockType::Unstyled,
        BlockType::HeaderOne,
        BlockType::HeaderTwo,
        BlockType::HeaderThree,
        BlockType::HeaderFour,
        BlockType::HeaderFive,
        BlockType::HeaderSix,
        BlockType::Blockquote,
        BlockType::UnorderedListItem,
        BlockType::OrderedListItem,
        BlockType::CodeBlock,
    ];

    /// Name used in the persisted document.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unstyled => "unstyled",
            Self::HeaderOne => "header-one",
            Self::HeaderTwo => "header-two",
            Self::HeaderThree => "header-three",
            Self::HeaderFour => "header-four",
            Self::HeaderFive => "header-five",
            Self::HeaderSix => "header-six",
            Self::Blockquote => "blockquote",
            Self::UnorderedListItem => "unordered-list-item",
            Self::OrderedListItem => "ordered-list-item",
            Self::CodeBlock => "code-block",
        }
    }

    /// Parse a persisted block type name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Header level 1-6, or `None` for non-header blocks.
    pub fn header_level(&self) -> Option<u8> {
        match self {
            Self::HeaderOne => Some(1),
            Self::HeaderTwo => Some(2),
            Self::HeaderThree => Some(3),
            Self::HeaderFour => Some(4),
            Self::HeaderFive => Some(5),
            Self::HeaderSix => Some(6),
            _ => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a block within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Content Block
// ─────────────────────────────────────────────────────────────────────────────

/// One paragraph-level unit of the document.
///
/// Invariant: `styles.len()` equals the number of characters in `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    key: BlockKey,
    block_type: BlockType,
    text: String,
    styles: Vec<StyleSet>,
    depth: u8,
}

impl ContentBlock {
    /// Create an empty unstyled block.
    pub fn new(key: BlockKey) -> Self {
        Self {
            key,
            block_type: BlockType::Unstyled,
            text: String::new(),
            styles: Vec::new(),
            depth: 0,
        }
    }

    /// Create a block with unstyled text.
    pub fn with_text(key: BlockKey, block_type: BlockType, text: impl Into<String>) -> Self {
        let text = text.into();
        let styles = vec![StyleSet::new(); char_count(&text)];
        Self {
            key,
            block_type,
            text,
            styles,
            depth: 0,
        }
    }

    /// Assemble a block from its parts. Returns `None` if the style list
    /// does not cover the text exactly.
    pub(crate) fn from_parts(
        key: BlockKey,
        block_type: BlockType,
        text: String,
        styles: Vec<StyleSet>,
        depth: u8,
    ) -> Option<Self> {
        if styles.len() != char_count(&text) {
            return None;
        }
        Some(Self {
            key,
            block_type,
            text,
            styles,
            depth,
        })
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Per-character style sets.
    pub fn styles(&self) -> &[StyleSet] {
        &self.styles
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Style set of the character at `offset` (empty past the end).
    pub fn style_at(&self, offset: usize) -> StyleSet {
        self.styles.get(offset).cloned().unwrap_or_default()
    }

    /// Whether every character in `[start, end)` carries `style`.
    /// An empty range never does.
    pub fn range_has_style(&self, start: usize, end: usize, style: InlineStyle) -> bool {
        let end = end.min(self.len());
        start < end && self.styles[start..end].iter().all(|s| s.contains(&style))
    }

    /// Contiguous runs of identical style sets as `(start, end, styles)`.
    pub fn style_runs(&self) -> Vec<(usize, usize, &StyleSet)> {
        let mut runs: Vec<(usize, usize, &StyleSet)> = Vec::new();
        for (i, style) in self.styles.iter().enumerate() {
            if let Some(last) = runs.last_mut() {
                if last.2 == style {
                    last.1 = i + 1;
                    continue;
                }
            }
            runs.push((i, i + 1, style));
        }
        runs
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived Blocks
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy of this block with a different type.
    pub fn with_block_type(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            ..self.clone()
        }
    }

    /// Copy of this block with `[start, end)` replaced by `text`, every
    /// inserted character carrying `style`.
    pub fn with_replaced_range(&self, start: usize, end: usize, text: &str, style: &StyleSet) -> Self {
        let len = self.len();
        let start = start.min(len);
        let end = end.clamp(start, len);

        let mut styles = Vec::with_capacity(len - (end - start) + char_count(text));
        styles.extend_from_slice(&self.styles[..start]);
        styles.extend(std::iter::repeat(style.clone()).take(char_count(text)));
        styles.extend_from_slice(&self.styles[end..]);

        Self {
            text: replace_char_range(&self.text, start, end, text),
            styles,
            ..self.clone()
        }
    }

    /// Copy of this block with `style` added to (or removed from) `[start, end)`.
    pub fn with_style_in_range(&self, start: usize, end: usize, style: InlineStyle, add: bool) -> Self {
        let end = end.min(self.len());
        let mut styles = self.styles.clone();
        for set in styles.iter_mut().take(end).skip(start) {
            if add {
                set.insert(style);
            } else {
                set.remove(&style);
            }
        }
        Self {
            styles,
            ..self.clone()
        }
    }

    /// Split at `offset`: this block keeps the head, a new block with
    /// `new_key` gets the tail. The tail keeps the type of list items and
    /// becomes unstyled otherwise.
    pub fn split_at(&self, offset: usize, new_key: BlockKey) -> (Self, Self) {
        let offset = offset.min(self.len());
        let head = Self {
            text: char_slice_to(&self.text, offset).to_string(),
            styles: self.styles[..offset].to_vec(),
            ..self.clone()
        };
        let tail_type = match self.block_type {
            BlockType::UnorderedListItem | BlockType::OrderedListItem | BlockType::CodeBlock => {
                self.block_type
            }
            _ => BlockType::Unstyled,
        };
        let tail = Self {
            key: new_key,
            block_type: tail_type,
            text: char_slice_from(&self.text, offset).to_string(),
            styles: self.styles[offset..].to_vec(),
            depth: self.depth,
        };
        (head, tail)
    }

    /// Append `other`'s text and styles to this block, keeping this block's
    /// key and type.
    pub fn joined_with(&self, other: &ContentBlock) -> Self {
        let mut text = self.text.clone();
        text.push_str(&other.text);
        let mut styles = self.styles.clone();
        styles.extend_from_slice(&other.styles);
        Self {
            text,
            styles,
            ..self.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> StyleSet {
        StyleSet::from([InlineStyle::Bold])
    }

    #[test]
    fn test_names_roundtrip() {
        for style in InlineStyle::ALL {
            assert_eq!(InlineStyle::from_name(style.name()), Some(style));
        }
        assert_eq!(BlockType::from_name("header-one"), Some(BlockType::HeaderOne));
        assert_eq!(BlockType::from_name("atomic"), None);
        assert_eq!(InlineStyle::from_name("bold"), None);
    }

    #[test]
    fn test_header_level() {
        assert_eq!(BlockType::HeaderOne.header_level(), Some(1));
        assert_eq!(BlockType::HeaderSix.header_level(), Some(6));
        assert_eq!(BlockType::Blockquote.header_level(), None);
    }

    #[test]
    fn test_with_text_has_unstyled_chars() {
        let block = ContentBlock::with_text(BlockKey::new("a"), BlockType::Unstyled, "på");
        assert_eq!(block.len(), 2);
        assert!(block.styles().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_from_parts_rejects_mismatched_styles() {
        let result = ContentBlock::from_parts(
            BlockKey::new("a"),
            BlockType::Unstyled,
            "abc".to_string(),
            vec![StyleSet::new(); 2],
            0,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_replace_range_styles_inserted_text() {
        let block = ContentBlock::with_text(BlockKey::new("a"), BlockType::Unstyled, "**hi");
        let block = block.with_replaced_range(0, 2, "", &StyleSet::new());
        assert_eq!(block.text(), "hi");

        let block = block.with_replaced_range(2, 2, "!!", &bold());
        assert_eq!(block.text(), "hi!!");
        assert_eq!(block.style_at(1), StyleSet::new());
        assert_eq!(block.style_at(2), bold());
        assert_eq!(block.styles().len(), 4);
    }

    #[test]
    fn test_style_in_range() {
        let block = ContentBlock::with_text(BlockKey::new("a"), BlockType::Unstyled, "hello");
        let block = block.with_style_in_range(1, 3, InlineStyle::Bold, true);
        assert!(block.range_has_style(1, 3, InlineStyle::Bold));
        assert!(!block.range_has_style(0, 3, InlineStyle::Bold));
        assert!(!block.range_has_style(2, 2, InlineStyle::Bold));

        let block = block.with_style_in_range(0, 5, InlineStyle::Bold, false);
        assert!(block.styles().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_style_runs() {
        let block = ContentBlock::with_text(BlockKey::new("a"), BlockType::Unstyled, "abcde")
            .with_style_in_range(1, 3, InlineStyle::Red, true);
        let runs: Vec<(usize, usize)> = block.style_runs().iter().map(|r| (r.0, r.1)).collect();
        assert_eq!(runs, vec![(0, 1), (1, 3), (3, 5)]);
    }

    #[test]
    fn test_split_and_join() {
        let block = ContentBlock::with_text(BlockKey::new("a"), BlockType::HeaderOne, "Title text")
            .with_style_in_range(6, 10, InlineStyle::Italic, true);
        let (head, tail) = block.split_at(5, BlockKey::new("b"));
        assert_eq!(head.text(), "Title");
        assert_eq!(head.block_type(), BlockType::HeaderOne);
        assert_eq!(tail.text(), " text");
        assert_eq!(tail.key().as_str(), "b");
        assert_eq!(tail.block_type(), BlockType::Unstyled);
        assert!(tail.range_has_style(1, 5, InlineStyle::Italic));

        let joined = head.joined_with(&tail);
        assert_eq!(joined.text(), "Title text");
        assert_eq!(joined.key().as_str(), "a");
        assert_eq!(joined.styles(), block.styles());
    }

    #[test]
    fn test_split_keeps_list_type() {
        let block =
            ContentBlock::with_text(BlockKey::new("a"), BlockType::UnorderedListItem, "one two");
        let (_, tail) = block.split_at(3, BlockKey::new("b"));
        assert_eq!(tail.block_type(), BlockType::UnorderedListItem);
    }
}
