//! Raw JSON form of document content.
//!
//! The persisted shape is a list of blocks, each with its text, type, depth
//! and a list of `{offset, length, style}` inline style ranges. Offsets and
//! lengths count UTF-16 code units, as in Draft.js raw documents, and are
//! converted to and from character offsets here. `entityRanges`, `data` and
//! `entityMap` are carried for compatibility with documents written by other
//! tools and are otherwise ignored.

use super::block::{BlockKey, BlockType, ContentBlock, InlineStyle, StyleSet};
use super::content::ContentState;
use crate::error::{Error, Result};
use crate::string_utils::utf16_boundaries;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serialized document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentState {
    pub blocks: Vec<RawContentBlock>,
    #[serde(default)]
    pub entity_map: Map<String, Value>,
}

/// Serialized block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentBlock {
    pub key: String,
    pub text: String,
    #[serde(rename = "type", default = "default_block_type")]
    pub block_type: String,
    #[serde(default)]
    pub depth: u8,
    #[serde(default)]
    pub inline_style_ranges: Vec<RawInlineStyleRange>,
    #[serde(default)]
    pub entity_ranges: Vec<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// One contiguous run of a single inline style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInlineStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: String,
}

fn default_block_type() -> String {
    BlockType::Unstyled.name().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Convert content to its raw serializable form.
pub fn convert_to_raw(content: &ContentState) -> RawContentState {
    let blocks = content
        .blocks()
        .iter()
        .map(|block| RawContentBlock {
            key: block.key().as_str().to_string(),
            text: block.text().to_string(),
            block_type: block.block_type().name().to_string(),
            depth: block.depth(),
            inline_style_ranges: style_ranges(block),
            entity_ranges: Vec::new(),
            data: Map::new(),
        })
        .collect();

    RawContentState {
        blocks,
        entity_map: Map::new(),
    }
}

/// Rebuild content from its raw form.
///
/// Unknown block types become `unstyled` and unknown style names are
/// skipped. Structural problems (no blocks, duplicate keys, style ranges
/// outside the text) are errors.
pub fn convert_from_raw(raw: &RawContentState) -> Result<ContentState> {
    let blocks = raw
        .blocks
        .iter()
        .map(block_from_raw)
        .collect::<Result<Vec<_>>>()?;
    ContentState::from_blocks(blocks)
}

fn block_from_raw(raw: &RawContentBlock) -> Result<ContentBlock> {
    let block_type = BlockType::from_name(&raw.block_type).unwrap_or_else(|| {
        debug!(
            "Unknown block type '{}' in block {}, using unstyled",
            raw.block_type, raw.key
        );
        BlockType::Unstyled
    });

    let boundaries = utf16_boundaries(&raw.text);
    let len = boundaries.len() - 1;
    let mut styles = vec![StyleSet::new(); len];
    for range in &raw.inline_style_ranges {
        // Both ends must land on character boundaries, not inside a surrogate pair.
        let start = boundaries.binary_search(&range.offset).ok();
        let end = range
            .offset
            .checked_add(range.length)
            .and_then(|end| boundaries.binary_search(&end).ok());
        let (Some(start), Some(end)) = (start, end) else {
            return Err(Error::invalid_document(format!(
                "style range {}+{} outside block {} of UTF-16 length {}",
                range.offset, range.length, raw.key, boundaries[len]
            )));
        };
        match InlineStyle::from_name(&range.style) {
            Some(style) => {
                for set in &mut styles[start..end] {
                    set.insert(style);
                }
            }
            None => debug!("Skipping unknown inline style '{}'", range.style),
        }
    }

    ContentBlock::from_parts(
        BlockKey::new(raw.key.clone()),
        block_type,
        raw.text.clone(),
        styles,
        raw.depth,
    )
    .ok_or_else(|| Error::invalid_document(format!("block {} has inconsistent styles", raw.key)))
}

/// Encode a block's per-character styles as one range list per style.
fn style_ranges(block: &ContentBlock) -> Vec<RawInlineStyleRange> {
    let boundaries = utf16_boundaries(block.text());
    let range = |start: usize, end: usize, style: InlineStyle| RawInlineStyleRange {
        offset: boundaries[start],
        length: boundaries[end] - boundaries[start],
        style: style.name().to_string(),
    };

    let mut ranges = Vec::new();
    for style in InlineStyle::ALL {
        let mut run_start: Option<usize> = None;
        for (i, set) in block.styles().iter().enumerate() {
            match (set.contains(&style), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    ranges.push(range(start, i, style));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            ranges.push(range(start, block.len(), style));
        }
    }
    ranges.sort_by_key(|r| r.offset);
    ranges
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_content() -> ContentState {
        let title = ContentBlock::with_text(BlockKey::new("t1"), BlockType::HeaderOne, "Notes");
        let body = ContentBlock::with_text(BlockKey::new("b2"), BlockType::Unstyled, "red and bold")
            .with_style_in_range(0, 3, InlineStyle::Red, true)
            .with_style_in_range(0, 12, InlineStyle::Bold, true);
        ContentState::from_blocks(vec![title, body]).unwrap()
    }

    #[test]
    fn test_convert_roundtrip_is_lossless() {
        let content = sample_content();
        let raw = convert_to_raw(&content);
        let restored = convert_from_raw(&raw).unwrap();
        assert_eq!(restored, content);
    }

    #[test]
    fn test_raw_json_shape() {
        let json = serde_json::to_value(convert_to_raw(&sample_content())).unwrap();
        assert_eq!(json["blocks"][0]["type"], "header-one");
        assert_eq!(json["blocks"][1]["key"], "b2");
        assert!(json["entityMap"].is_object());

        let ranges = json["blocks"][1]["inlineStyleRanges"].as_array().unwrap();
        assert_eq!(ranges.len(), 2);
        assert!(ranges
            .iter()
            .any(|r| r["style"] == "RED" && r["offset"] == 0 && r["length"] == 3));
        assert!(ranges
            .iter()
            .any(|r| r["style"] == "BOLD" && r["offset"] == 0 && r["length"] == 12));
    }

    #[test]
    fn test_parse_minimal_external_document() {
        let json = r#"{
            "blocks": [{"key": "abcde", "text": "hi", "type": "atomic",
                        "inlineStyleRanges": [{"offset": 0, "length": 2, "style": "HIGHLIGHT"}]}],
            "entityMap": {}
        }"#;
        let raw: RawContentState = serde_json::from_str(json).unwrap();
        let content = convert_from_raw(&raw).unwrap();
        let block = content.first_block();
        assert_eq!(block.block_type(), BlockType::Unstyled);
        assert!(block.styles().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_out_of_range_style_is_error() {
        let raw = RawContentState {
            blocks: vec![RawContentBlock {
                key: "a".to_string(),
                text: "abc".to_string(),
                block_type: "unstyled".to_string(),
                depth: 0,
                inline_style_ranges: vec![RawInlineStyleRange {
                    offset: 2,
                    length: 5,
                    style: "BOLD".to_string(),
                }],
                entity_ranges: Vec::new(),
                data: Map::new(),
            }],
            entity_map: Map::new(),
        };
        assert!(matches!(convert_from_raw(&raw), Err(Error::DocumentParse { .. })));
    }

    #[test]
    fn test_empty_block_list_is_error() {
        let raw = RawContentState {
            blocks: Vec::new(),
            entity_map: Map::new(),
        };
        assert!(convert_from_raw(&raw).is_err());
    }

    #[test]
    fn test_raw_offsets_count_utf16_units() {
        // '🎉' is one character but two UTF-16 units
        let block = ContentBlock::with_text(BlockKey::new("a"), BlockType::Unstyled, "på 🎉 ok")
            .with_style_in_range(3, 4, InlineStyle::Underline, true)
            .with_style_in_range(5, 7, InlineStyle::Bold, true);
        let content = ContentState::from_blocks(vec![block]).unwrap();
        let raw = convert_to_raw(&content);

        let ranges = &raw.blocks[0].inline_style_ranges;
        let underline = ranges.iter().find(|r| r.style == "UNDERLINE").unwrap();
        assert_eq!((underline.offset, underline.length), (3, 2));
        let bold = ranges.iter().find(|r| r.style == "BOLD").unwrap();
        assert_eq!((bold.offset, bold.length), (6, 2));

        assert_eq!(convert_from_raw(&raw).unwrap(), content);
    }

    #[test]
    fn test_parse_utf16_ranges_from_external_document() {
        let json = r#"{
            "blocks": [{"key": "k", "text": "🎉🎉 red", "type": "unstyled",
                        "inlineStyleRanges": [{"offset": 5, "length": 3, "style": "RED"}]}],
            "entityMap": {}
        }"#;
        let raw: RawContentState = serde_json::from_str(json).unwrap();
        let content = convert_from_raw(&raw).unwrap();
        let block = content.first_block();
        assert!(block.range_has_style(3, 6, InlineStyle::Red));
        assert!(!block.range_has_style(0, 3, InlineStyle::Red));
    }

    #[test]
    fn test_range_inside_surrogate_pair_is_error() {
        let json = r#"{
            "blocks": [{"key": "k", "text": "🎉a", "type": "unstyled",
                        "inlineStyleRanges": [{"offset": 1, "length": 2, "style": "BOLD"}]}],
            "entityMap": {}
        }"#;
        let raw: RawContentState = serde_json::from_str(json).unwrap();
        assert!(matches!(convert_from_raw(&raw), Err(Error::DocumentParse { .. })));
    }
}
