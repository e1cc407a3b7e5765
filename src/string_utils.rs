//! Character-Offset String Utilities
//!
//! Block text is addressed in character offsets (not bytes) everywhere in the
//! document model: selections and inline style ranges count `char`s. These
//! helpers convert character offsets to byte offsets so slicing never panics
//! on multi-byte characters, and to UTF-16 offsets for the persisted form.
//!
//! # Problem
//! Characters like `ø`, `æ`, `å`, `中`, `🎉` are multi-byte in UTF-8.
//! A caret at character 5 is not byte 5 once any of them appear earlier.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::char_slice;
//!
//! let text = "Hei på deg";
//! assert_eq!(char_slice(text, 4, 6), "på");
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Counting
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in `s`.
#[inline]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character index to a byte index.
///
/// Returns the string length if `char_index` is beyond the string.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// UTF-16 offset of every character boundary in `s`, including the end.
///
/// Entry `i` is the UTF-16 offset of character `i`; the table has
/// `char_count(s) + 1` entries.
pub fn utf16_boundaries(s: &str) -> Vec<usize> {
    let mut boundaries = Vec::with_capacity(s.len() + 1);
    let mut offset = 0;
    boundaries.push(offset);
    for ch in s.chars() {
        offset += ch.len_utf16();
        boundaries.push(offset);
    }
    boundaries
}

// ─────────────────────────────────────────────────────────────────────────────
// Slicing
// ─────────────────────────────────────────────────────────────────────────────

/// Slice `s` between two character offsets.
///
/// Offsets past the end are clamped; if `start >= end` the result is empty.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    if start >= end {
        return "";
    }
    let start = char_index_to_byte_index(s, start);
    let end = char_index_to_byte_index(s, end);
    &s[start..end]
}

/// Slice from the beginning of `s` up to (not including) character `end`.
#[inline]
pub fn char_slice_to(s: &str, end: usize) -> &str {
    char_slice(s, 0, end)
}

/// Slice from character `start` to the end of `s`.
#[inline]
pub fn char_slice_from(s: &str, start: usize) -> &str {
    &s[char_index_to_byte_index(s, start)..]
}

/// Replace the characters in `[start, end)` with `replacement`.
///
/// Offsets are clamped to the string; an inverted range inserts at `start`.
pub fn replace_char_range(s: &str, start: usize, end: usize, replacement: &str) -> String {
    let end = end.max(start);
    let start_byte = char_index_to_byte_index(s, start);
    let end_byte = char_index_to_byte_index(s, end);
    let mut out = String::with_capacity(s.len() - (end_byte - start_byte) + replacement.len());
    out.push_str(&s[..start_byte]);
    out.push_str(replacement);
    out.push_str(&s[end_byte..]);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_count_multibyte() {
        assert_eq!(char_count(""), 0);
        assert_eq!(char_count("Hei på"), 6);
        assert_eq!(char_count("你好🎉"), 3);
    }

    #[test]
    fn test_char_to_byte_index() {
        let s = "Hei på"; // H(1) e(1) i(1) ' '(1) p(1) å(2) = 7 bytes, 6 chars
        assert_eq!(char_index_to_byte_index(s, 0), 0);
        assert_eq!(char_index_to_byte_index(s, 5), 5); // 'å' starts at byte 5
        assert_eq!(char_index_to_byte_index(s, 6), 7); // End
        assert_eq!(char_index_to_byte_index(s, 100), 7); // Beyond end
    }

    #[test]
    fn test_utf16_boundaries() {
        assert_eq!(utf16_boundaries(""), vec![0]);
        assert_eq!(utf16_boundaries("på"), vec![0, 1, 2]);
        // '🎉' is a surrogate pair
        assert_eq!(utf16_boundaries("a🎉b"), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_char_slice() {
        let s = "Hei på deg";
        assert_eq!(char_slice(s, 4, 6), "på");
        assert_eq!(char_slice(s, 7, 100), "deg");
        assert_eq!(char_slice(s, 3, 3), "");
        assert_eq!(char_slice(s, 5, 2), "");
    }

    #[test]
    fn test_char_slice_to_and_from() {
        let s = "你好世界";
        assert_eq!(char_slice_to(s, 2), "你好");
        assert_eq!(char_slice_from(s, 2), "世界");
        assert_eq!(char_slice_to(s, 0), "");
        assert_eq!(char_slice_from(s, 9), "");
    }

    #[test]
    fn test_replace_char_range() {
        assert_eq!(replace_char_range("**hello", 0, 2, ""), "hello");
        assert_eq!(replace_char_range("Party time", 5, 6, " 🎉 "), "Party 🎉 time");
        assert_eq!(replace_char_range("abc", 3, 3, "d"), "abcd");
        assert_eq!(replace_char_range("abc", 2, 1, "X"), "abXc");
    }

    #[test]
    fn test_no_panic_on_any_char_index() {
        let s = "Hello 世界! 🎉 Café naïve";
        for i in 0..=char_count(s) + 3 {
            for j in 0..=char_count(s) + 3 {
                let _ = char_slice(s, i, j);
                let _ = replace_char_range(s, i, j, "x");
            }
        }
    }
}
