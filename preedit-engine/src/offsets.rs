//! Signed offset arithmetic for caret placement
//!
//! Input methods describe caret positions relative to other positions and
//! may overshoot either end of the text. Out-of-range values are clamped,
//! never rejected.

use crate::range::PlainTextRange;

/// Build a selection range from signed offsets, clamped into `[0, right_boundary]`.
///
/// `right_boundary` is the length the text will have once the pending edit
/// has been applied (for example, the current length minus the composition
/// being replaced plus the replacement length).
pub fn create_range_for_selection(start: i64, end: i64, right_boundary: usize) -> PlainTextRange {
    let clamp = |offset: i64| -> usize {
        if offset <= 0 {
            0
        } else {
            usize::try_from(offset).map_or(right_boundary, |o| o.min(right_boundary))
        }
    };
    PlainTextRange::from_unordered(clamp(start), clamp(end))
}

/// Caret offset after inserting `text_len` units at `text_start` and moving
/// `relative` units from the end of the inserted text.
pub fn absolute_caret_position(text_start: usize, text_len: usize, relative: i32) -> i64 {
    text_start as i64 + text_len as i64 + i64::from(relative)
}
