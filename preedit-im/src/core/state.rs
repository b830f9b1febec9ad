//! Composition state machine
//!
//! Defines the states of the controller. Whether a composition is *active*
//! is not stored here: it depends on the span's anchors still covering live
//! text, which only the host can answer.

use super::decoration::DecorationMarker;
use crate::host::AnchorId;

/// The anchored range covering the composing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositionSpan {
    /// Host anchor at the composition start
    pub start: AnchorId,
    /// Host anchor at the composition end
    pub end: AnchorId,
    /// Set when the composing text was written by `set_composition`, cleared
    /// when the span was made from existing text
    pub is_dirty: bool,
}

/// The current state of the controller
#[derive(Debug, Clone, Default)]
pub enum CompositionState {
    /// No composition
    #[default]
    Idle,

    /// A composition span exists (it may have gone stale since)
    Composing {
        span: CompositionSpan,
        /// Markers of the last `set_composition*` call, relative to the span start
        decorations: Vec<DecorationMarker>,
    },
}

impl CompositionState {
    /// Check if no span is held
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn span(&self) -> Option<&CompositionSpan> {
        match self {
            Self::Idle => None,
            Self::Composing { span, .. } => Some(span),
        }
    }

    pub fn span_mut(&mut self) -> Option<&mut CompositionSpan> {
        match self {
            Self::Idle => None,
            Self::Composing { span, .. } => Some(span),
        }
    }

    pub fn decorations(&self) -> &[DecorationMarker] {
        match self {
            Self::Idle => &[],
            Self::Composing { decorations, .. } => decorations,
        }
    }

    /// Whether the composing text was written by the controller since the
    /// span was created
    pub fn is_dirty(&self) -> bool {
        self.span().is_some_and(|span| span.is_dirty)
    }

    /// Leave the composing state, returning the span that was held
    pub fn take(&mut self) -> Option<CompositionSpan> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Composing { span, .. } => Some(span),
        }
    }
}
