//! Plain-text ranges measured in UTF-16 code units

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`PlainTextRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range start {start} is past its end {end}")]
    Inverted { start: usize, end: usize },
}

/// A `[start, end)` pair of UTF-16 code-unit offsets relative to an editable scope.
///
/// The value is immutable once built and always satisfies `start <= end`.
/// An unset range is expressed as `Option<PlainTextRange>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct PlainTextRange {
    start: usize,
    end: usize,
}

#[derive(Deserialize)]
struct RawRange {
    start: usize,
    end: usize,
}

impl TryFrom<RawRange> for PlainTextRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PlainTextRange {
    pub fn new(start: usize, end: usize) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a collapsed range (a caret) at `offset`
    pub fn collapsed(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Create a range from two offsets in either order
    pub fn from_unordered(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Same as [`is_empty`](Self::is_empty); reads better for carets.
    pub fn is_collapsed(&self) -> bool {
        self.is_empty()
    }

    /// Clamp both endpoints into `[0, len]`.
    pub fn clamp_to(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    /// Translate a range expressed relative to `base` into an absolute one.
    ///
    /// Saturates at `usize::MAX` instead of overflowing.
    pub fn offset_by(self, base: usize) -> Self {
        Self {
            start: self.start.saturating_add(base),
            end: self.end.saturating_add(base),
        }
    }
}

impl std::fmt::Display for PlainTextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
