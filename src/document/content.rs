//! Immutable document content: an ordered list of blocks.

use super::block::{BlockKey, ContentBlock};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// The full text content of a document.
///
/// Always holds at least one block, and block keys are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentState {
    blocks: Vec<ContentBlock>,
}

impl ContentState {
    /// A document with a single empty unstyled block.
    pub fn create_empty() -> Self {
        let key = BlockKey::new(key_for_index(0));
        Self {
            blocks: vec![ContentBlock::new(key)],
        }
    }

    /// Build content from blocks, validating the invariants.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(Error::invalid_document("document has no blocks"));
        }
        let mut seen = HashSet::new();
        for block in &blocks {
            if block.key().as_str().is_empty() {
                return Err(Error::invalid_document("block with empty key"));
            }
            if !seen.insert(block.key()) {
                return Err(Error::invalid_document(format!(
                    "duplicate block key '{}'",
                    block.key()
                )));
            }
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn first_block(&self) -> &ContentBlock {
        &self.blocks[0]
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| b.key() == key)
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.key() == key)
    }

    pub fn block_before(&self, key: &BlockKey) -> Option<&ContentBlock> {
        let index = self.block_index(key)?;
        index.checked_sub(1).map(|i| &self.blocks[i])
    }

    pub fn block_after(&self, key: &BlockKey) -> Option<&ContentBlock> {
        let index = self.block_index(key)?;
        self.blocks.get(index + 1)
    }

    /// True when the document is a single empty block.
    pub fn is_blank(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].is_empty()
    }

    /// Block texts joined with newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A key not used by any block in this document.
    pub fn generate_key(&self) -> BlockKey {
        let used: HashSet<&str> = self.blocks.iter().map(|b| b.key().as_str()).collect();
        (self.blocks.len()..)
            .map(key_for_index)
            .find(|candidate| !used.contains(candidate.as_str()))
            .map(BlockKey::new)
            .unwrap_or_else(|| BlockKey::new(key_for_index(usize::MAX)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy with the block sharing `block`'s key replaced by `block`.
    /// Unknown keys leave the content unchanged.
    pub fn with_block(&self, block: ContentBlock) -> Self {
        let mut blocks = self.blocks.clone();
        if let Some(slot) = blocks.iter_mut().find(|b| b.key() == block.key()) {
            *slot = block;
        }
        Self { blocks }
    }

    /// Copy with the block at `key` replaced by `replacement` (one or more
    /// blocks). Returns `None` for unknown keys or an empty replacement.
    pub fn with_block_replaced_by(&self, key: &BlockKey, replacement: Vec<ContentBlock>) -> Option<Self> {
        if replacement.is_empty() {
            return None;
        }
        let index = self.block_index(key)?;
        let mut blocks = self.blocks.clone();
        blocks.splice(index..=index, replacement);
        Some(Self { blocks })
    }

    /// Copy without the block at `key`. The last remaining block is never
    /// removed.
    pub fn without_block(&self, key: &BlockKey) -> Self {
        if self.blocks.len() == 1 {
            return self.clone();
        }
        let blocks = self
            .blocks
            .iter()
            .filter(|b| b.key() != key)
            .cloned()
            .collect();
        Self { blocks }
    }
}

impl Default for ContentState {
    fn default() -> Self {
        Self::create_empty()
    }
}

/// Five-character base-36 key, zero padded.
fn key_for_index(index: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = index;
    let mut out = [b'0'; 5];
    for slot in out.iter_mut().rev() {
        *slot = DIGITS[n % 36];
        n /= 36;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
