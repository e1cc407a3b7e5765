//! Caret and range selection within a single block.

use super::block::BlockKey;

/// A caret or range inside one block, in character offsets.
///
/// `anchor` is where the selection started and `focus` is where the caret
/// currently is; they are equal for a collapsed caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    block_key: BlockKey,
    anchor_offset: usize,
    focus_offset: usize,
}

impl SelectionState {
    /// Collapsed caret at `offset`.
    pub fn collapsed(block_key: BlockKey, offset: usize) -> Self {
        Self {
            block_key,
            anchor_offset: offset,
            focus_offset: offset,
        }
    }

    /// Range from `anchor_offset` to `focus_offset`.
    pub fn range(block_key: BlockKey, anchor_offset: usize, focus_offset: usize) -> Self {
        Self {
            block_key,
            anchor_offset,
            focus_offset,
        }
    }

    pub fn block_key(&self) -> &BlockKey {
        &self.block_key
    }

    pub fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    pub fn focus_offset(&self) -> usize {
        self.focus_offset
    }

    pub fn start_offset(&self) -> usize {
        self.anchor_offset.min(self.focus_offset)
    }

    pub fn end_offset(&self) -> usize {
        self.anchor_offset.max(self.focus_offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_offset == self.focus_offset
    }

    /// Copy with the focus moved, keeping the anchor.
    pub fn with_focus(&self, focus_offset: usize) -> Self {
        Self {
            focus_offset,
            ..self.clone()
        }
    }

    /// Copy with both offsets clamped to a block of `len` characters.
    pub fn clamped(&self, len: usize) -> Self {
        Self {
            block_key: self.block_key.clone(),
            anchor_offset: self.anchor_offset.min(len),
            focus_offset: self.focus_offset.min(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_end_ordering() {
        let sel = SelectionState::range(BlockKey::new("a"), 5, 2);
        assert_eq!(sel.start_offset(), 2);
        assert_eq!(sel.end_offset(), 5);
        assert!(!sel.is_collapsed());
        assert!(SelectionState::collapsed(BlockKey::new("a"), 3).is_collapsed());
    }

    #[test]
    fn test_with_focus_and_clamp() {
        let sel = SelectionState::collapsed(BlockKey::new("a"), 4).with_focus(9);
        assert_eq!(sel.anchor_offset(), 4);
        assert_eq!(sel.focus_offset(), 9);

        let clamped = sel.clamped(6);
        assert_eq!(clamped.start_offset(), 4);
        assert_eq!(clamped.end_offset(), 6);
    }
}
