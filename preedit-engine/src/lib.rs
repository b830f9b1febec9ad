pub mod diff;
pub mod grapheme;
pub mod offsets;
pub mod range;
pub mod utf16;

pub use diff::{
    CompositionDiff, common_prefix_length, common_suffix_length, grapheme_safe_prefix_length,
    grapheme_safe_suffix_length,
};
pub use grapheme::{BoundaryQuery, TextBoundaries};
pub use offsets::{absolute_caret_position, create_range_for_selection};
pub use range::{PlainTextRange, RangeError};
pub use utf16::utf16_len;
