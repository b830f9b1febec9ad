//! Minimal composition diffs
//!
//! When an input method replaces the composing text, only the middle segment
//! that actually changed is rewritten in the document. The common prefix and
//! suffix are measured in UTF-16 code units and then narrowed so that neither
//! ends inside a grapheme cluster of the text currently in the document.

use tracing::trace;

use crate::grapheme::BoundaryQuery;
use crate::range::PlainTextRange;
use crate::utf16;

/// Number of leading UTF-16 code units shared by `a` and `b`.
pub fn common_prefix_length(a: &str, b: &str) -> usize {
    a.encode_utf16()
        .zip(b.encode_utf16())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Number of trailing UTF-16 code units shared by `a` and `b`.
///
/// Measured over the whole of both strings. When a prefix has already been
/// matched, pass the remainders so that prefix and suffix cannot overlap.
pub fn common_suffix_length(a: &str, b: &str) -> usize {
    let a: Vec<u16> = a.encode_utf16().collect();
    let b: Vec<u16> = b.encode_utf16().collect();
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Common prefix of `old` and `new`, shortened to a grapheme boundary of `old`.
///
/// `old` is the text in the document starting at plain-text offset `base`;
/// `boundaries` answers queries in that same offset space. The result is never
/// longer than the raw prefix. An unresolvable position yields 0.
pub fn grapheme_safe_prefix_length(
    old: &str,
    new: &str,
    base: usize,
    boundaries: &(impl BoundaryQuery + ?Sized),
) -> usize {
    let raw = common_prefix_length(old, new);
    match boundaries.distance_to_left_boundary(base + raw) {
        Some(diff) => raw.saturating_sub(diff),
        None => 0,
    }
}

/// Common suffix of `old` and `new`, shortened to a grapheme boundary of `old`.
///
/// The suffix is measured over the strings given; the boundary query is made
/// at the point in `old` where the suffix starts.
pub fn grapheme_safe_suffix_length(
    old: &str,
    new: &str,
    base: usize,
    boundaries: &(impl BoundaryQuery + ?Sized),
) -> usize {
    let raw = common_suffix_length(old, new);
    let suffix_start = base + utf16::utf16_len(old) - raw;
    match boundaries.distance_to_right_boundary(suffix_start) {
        Some(diff) => raw.saturating_sub(diff),
        None => 0,
    }
}

/// The edit that turns the current composing text into a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionDiff {
    /// Leading code units kept as-is
    pub prefix_len: usize,
    /// Trailing code units kept as-is
    pub suffix_len: usize,
    /// Code units of the old text removed between prefix and suffix
    pub deleted_len: usize,
    /// Text inserted between prefix and suffix
    pub inserted: String,
}

impl CompositionDiff {
    /// Diff `old` (anchored at `base` in the document) against `new`.
    ///
    /// The prefix is matched first; the suffix is then matched over what
    /// remains of both strings. There is no rebalancing between the two, so
    /// a string that could share more suffix by giving up some prefix keeps
    /// the greedy prefix.
    pub fn compute(
        old: &str,
        new: &str,
        base: usize,
        boundaries: &(impl BoundaryQuery + ?Sized),
    ) -> Self {
        let old_len = utf16::utf16_len(old);
        let new_len = utf16::utf16_len(new);

        let prefix_len = grapheme_safe_prefix_length(old, new, base, boundaries);
        let old_rest = utf16::slice(old, prefix_len, old_len);
        let new_rest = utf16::slice(new, prefix_len, new_len);
        let suffix_len =
            grapheme_safe_suffix_length(old_rest, new_rest, base + prefix_len, boundaries);

        // the kept ends sit on grapheme boundaries of the document, so the
        // shared units in `new` cannot end inside a surrogate pair either
        debug_assert!(utf16::is_char_boundary(new, prefix_len));
        debug_assert!(utf16::is_char_boundary(new, new_len - suffix_len));

        let deleted_len = old_len - prefix_len - suffix_len;
        let inserted = utf16::slice(new, prefix_len, new_len - suffix_len).to_string();

        trace!(
            "composition diff: prefix={} suffix={} deleted={} inserted={:?}",
            prefix_len, suffix_len, deleted_len, inserted
        );

        Self {
            prefix_len,
            suffix_len,
            deleted_len,
            inserted,
        }
    }

    /// True when nothing needs to be inserted or deleted.
    pub fn is_noop(&self) -> bool {
        self.deleted_len == 0 && self.inserted.is_empty()
    }

    pub fn is_inserting(&self) -> bool {
        !self.inserted.is_empty()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleted_len > 0
    }

    /// Absolute range of the old text to replace, given the composition start.
    pub fn replaced_range(&self, base: usize) -> PlainTextRange {
        let start = base + self.prefix_len;
        PlainTextRange::from_unordered(start, start + self.deleted_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grapheme::TextBoundaries;

    #[test]
    fn test_common_prefix_length() {
        assert_eq!(common_prefix_length("ni", "nih"), 2);
        assert_eq!(common_prefix_length("abc", "xbc"), 0);
        assert_eq!(common_prefix_length("", "abc"), 0);
        assert_eq!(common_prefix_length("same", "same"), 4);
    }

    #[test]
    fn test_common_suffix_length() {
        assert_eq!(common_suffix_length("ni", "nih"), 0);
        assert_eq!(common_suffix_length("abc", "xbc"), 2);
        assert_eq!(common_suffix_length("abc", ""), 0);
        // full strings, so prefix and suffix can overlap
        assert_eq!(common_suffix_length("aa", "aaa"), 2);
    }

    #[test]
    fn test_diff_appends_only_new_text() {
        let old = "ni";
        let b = TextBoundaries::new(old);
        let diff = CompositionDiff::compute(old, "nih", 0, &b);
        assert_eq!(diff.prefix_len, 2);
        assert_eq!(diff.suffix_len, 0);
        assert_eq!(diff.deleted_len, 0);
        assert_eq!(diff.inserted, "h");
        assert_eq!(diff.replaced_range(0), PlainTextRange::collapsed(2));
    }

    #[test]
    fn test_diff_replaces_middle() {
        let old = "kanji";
        let b = TextBoundaries::new(old);
        let diff = CompositionDiff::compute(old, "kaxji", 0, &b);
        assert_eq!(diff.prefix_len, 2);
        assert_eq!(diff.suffix_len, 2);
        assert_eq!(diff.deleted_len, 1);
        assert_eq!(diff.inserted, "x");
        assert_eq!(diff.replaced_range(0), PlainTextRange::new(2, 3).unwrap());
    }

    #[test]
    fn test_diff_prefix_excluded_before_suffix() {
        let old = "aa";
        let b = TextBoundaries::new(old);
        let diff = CompositionDiff::compute(old, "aaa", 0, &b);
        assert_eq!(diff.prefix_len, 2);
        assert_eq!(diff.suffix_len, 0);
        assert_eq!(diff.inserted, "a");
        assert!(!diff.is_noop());
    }

    #[test]
    fn test_identical_text_is_noop() {
        let old = "nihao";
        let b = TextBoundaries::new(old);
        let diff = CompositionDiff::compute(old, "nihao", 0, &b);
        assert!(diff.is_noop());
        assert!(!diff.is_inserting());
        assert!(!diff.is_deleting());
    }

    #[test]
    fn test_prefix_never_splits_surrogate_pair() {
        // U+1F600 = D83D DE00, U+1F601 = D83D DE01: raw prefix stops after "a" + high surrogate
        let old = "a\u{1F600}";
        let new = "a\u{1F601}";
        assert_eq!(common_prefix_length(old, new), 2);
        let b = TextBoundaries::new(old);
        assert_eq!(grapheme_safe_prefix_length(old, new, 0, &b), 1);

        let diff = CompositionDiff::compute(old, new, 0, &b);
        assert_eq!(diff.prefix_len, 1);
        assert_eq!(diff.deleted_len, 2);
        assert_eq!(diff.inserted, "\u{1F601}");
    }

    #[test]
    fn test_suffix_never_splits_surrogate_pair() {
        // U+10000 = D800 DC00, U+10400 = D801 DC00: raw suffix is the shared low surrogate
        let old = "\u{10000}";
        let new = "\u{10400}";
        assert_eq!(common_suffix_length(old, new), 1);
        let b = TextBoundaries::new(old);
        assert_eq!(grapheme_safe_suffix_length(old, new, 0, &b), 0);
    }

    #[test]
    fn test_unresolvable_position_yields_zero() {
        struct Detached;
        impl BoundaryQuery for Detached {
            fn distance_to_left_boundary(&self, _offset: usize) -> Option<usize> {
                None
            }
            fn distance_to_right_boundary(&self, _offset: usize) -> Option<usize> {
                None
            }
        }
        assert_eq!(grapheme_safe_prefix_length("abc", "abd", 0, &Detached), 0);
        assert_eq!(grapheme_safe_suffix_length("abc", "xbc", 0, &Detached), 0);
    }

    #[test]
    fn test_base_offset_is_honoured() {
        // composition "ni" sits after "xx" in the document
        let document = "xxni";
        let b = TextBoundaries::new(document);
        let diff = CompositionDiff::compute("ni", "nih", 2, &b);
        assert_eq!(diff.prefix_len, 2);
        assert_eq!(diff.replaced_range(2), PlainTextRange::collapsed(4));
    }
}
