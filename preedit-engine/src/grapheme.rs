//! Grapheme cluster boundary queries in UTF-16 offsets
//!
//! A grapheme cluster is what users perceive as a single character: a
//! surrogate pair, a base letter with combining marks, a ZWJ emoji sequence,
//! a regional indicator pair. Diffing and deletion must never stop inside one.

use unicode_segmentation::UnicodeSegmentation;

/// Distance from a plain-text offset to its nearest grapheme boundary.
///
/// Implemented by whoever owns the text the offsets point into. `None` means
/// the offset could not be resolved to a live position.
pub trait BoundaryQuery {
    /// Code units between `offset` and the nearest boundary at or before it.
    fn distance_to_left_boundary(&self, offset: usize) -> Option<usize>;

    /// Code units between `offset` and the nearest boundary at or after it.
    fn distance_to_right_boundary(&self, offset: usize) -> Option<usize>;
}

/// Precomputed extended grapheme cluster boundaries of a string.
#[derive(Debug, Clone)]
pub struct TextBoundaries {
    /// Sorted boundary offsets, always starting with 0 and ending with the length
    boundaries: Vec<usize>,
}

impl TextBoundaries {
    pub fn new(text: &str) -> Self {
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        let mut units = 0;
        boundaries.push(0);
        for grapheme in text.graphemes(true) {
            units += grapheme.chars().map(char::len_utf16).sum::<usize>();
            boundaries.push(units);
        }
        Self { boundaries }
    }

    /// Length of the text in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest boundary at or before `offset` (clamped to the length).
    pub fn left_boundary(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        match self.boundaries.binary_search(&offset) {
            Ok(_) => offset,
            // 0 is always a boundary, so the insertion point is at least 1
            Err(index) => self.boundaries[index - 1],
        }
    }

    /// Nearest boundary at or after `offset` (clamped to the length).
    pub fn right_boundary(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        match self.boundaries.binary_search(&offset) {
            Ok(_) => offset,
            Err(index) => self.boundaries[index],
        }
    }
}

impl BoundaryQuery for TextBoundaries {
    fn distance_to_left_boundary(&self, offset: usize) -> Option<usize> {
        if offset > self.len() {
            return None;
        }
        Some(offset - self.left_boundary(offset))
    }

    fn distance_to_right_boundary(&self, offset: usize) -> Option<usize> {
        if offset > self.len() {
            return None;
        }
        Some(self.right_boundary(offset) - offset)
    }
}
