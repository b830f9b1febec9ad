//! UTF-16 offset helpers over Rust strings
//!
//! Offsets exchanged with input methods count UTF-16 code units, while Rust
//! strings are indexed by UTF-8 bytes. These helpers convert between the two.
//! An offset that falls between the two halves of a surrogate pair has no
//! UTF-8 counterpart; conversions floor it to the start of that character.

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset into a byte offset, clamped to the text length.
///
/// Offsets inside a surrogate pair are floored to the character start.
pub fn to_byte_offset(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units + ch.len_utf16() > offset {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}

/// Convert a byte offset into a UTF-16 offset.
///
/// A byte offset inside a multi-byte character is floored to the character start.
pub fn from_byte_offset(text: &str, byte: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if index + ch.len_utf8() > byte {
            return units;
        }
        units += ch.len_utf16();
    }
    units
}

/// Whether `offset` sits on a character boundary (not inside a surrogate pair).
pub fn is_char_boundary(text: &str, offset: usize) -> bool {
    let mut units = 0;
    for ch in text.chars() {
        if units >= offset {
            return units == offset;
        }
        units += ch.len_utf16();
    }
    units == offset
}

/// Slice `text` by UTF-16 offsets; both ends are clamped and floored.
pub fn slice(text: &str, start: usize, end: usize) -> &str {
    let start = to_byte_offset(text, start);
    let end = to_byte_offset(text, end).max(start);
    &text[start..end]
}
