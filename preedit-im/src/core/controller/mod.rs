//! Composition controller - the state machine and mutation commands
//!
//! This module contains the main `InputMethodController` struct. It owns the
//! composition state and drives a [`Host`] through selection changes,
//! insertions, deletions and event dispatch.
//!
//! Every event dispatch runs host callbacks synchronously. Those callbacks
//! may edit the document, move the selection or tear the document down, so
//! each command re-checks availability and document identity after every
//! dispatch and every mutation, and stops silently when the check fails.
//! Edits already made are kept.

mod caret;
mod composition;
mod confirm;
mod surrounding;
mod types;

pub use composition::selection_range_for_set_composition;
pub use types::*;

use types::CompositionRequest;

#[cfg(test)]
mod tests;

use preedit_engine::{PlainTextRange, utf16};
use tracing::{debug, trace};

use super::decoration::DecorationMarker;
use super::error::{ControllerError, Result};
use super::state::{CompositionSpan, CompositionState};
use super::translator::{Affinity, OffsetTranslator};
use crate::host::{DocumentId, Host};

/// The composition controller
#[derive(Debug, Default)]
pub struct InputMethodController {
    /// Current composition state
    state: CompositionState,
    /// Controller configuration
    config: ControllerConfig,
}

impl InputMethodController {
    /// Create a controller with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self {
            state: CompositionState::Idle,
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Identity of the document at command entry.
    fn document<H: Host + ?Sized>(host: &H) -> Result<DocumentId> {
        if !host.is_available() {
            return Err(ControllerError::NotAvailable);
        }
        host.document_id().ok_or(ControllerError::NotAvailable)
    }

    /// Guard run after yielding to the host.
    fn check_available<H: Host + ?Sized>(host: &H, document: DocumentId) -> Result<()> {
        if host.is_available() && host.document_id() == Some(document) {
            Ok(())
        } else {
            debug!("host became unavailable, aborting command");
            Err(ControllerError::NotAvailable)
        }
    }

    /// Plain-text range of the span, even when collapsed.
    fn span_range<H: Host + ?Sized>(&self, host: &H) -> Option<PlainTextRange> {
        let span = self.state.span()?;
        let start = host.anchor_position(span.start)?;
        let end = host.anchor_position(span.end)?;
        let translator = OffsetTranslator::new(host);
        let start = translator.to_plain_text_offset(start)?;
        let end = translator.to_plain_text_offset(end)?;
        Some(PlainTextRange::from_unordered(start, end))
    }

    /// Plain-text offset of the span start.
    fn span_start<H: Host + ?Sized>(&self, host: &H) -> Option<usize> {
        let span = self.state.span()?;
        let start = host.anchor_position(span.start)?;
        OffsetTranslator::new(host).to_plain_text_offset(start)
    }

    /// Range of the active composition.
    ///
    /// `None` while idle, and also when the span was collapsed or
    /// disconnected by edits made outside the controller.
    pub fn composition_range<H: Host + ?Sized>(&self, host: &H) -> Option<PlainTextRange> {
        if !host.is_available() {
            return None;
        }
        self.span_range(host).filter(|range| !range.is_collapsed())
    }

    /// Whether a composition is active. Recomputed on every call.
    pub fn has_composition<H: Host + ?Sized>(&self, host: &H) -> bool {
        self.composition_range(host).is_some()
    }

    /// The active composition, or why there is none.
    fn active_composition<H: Host + ?Sized>(&self, host: &H) -> Result<PlainTextRange> {
        if self.state.is_idle() {
            return Err(ControllerError::NoActiveComposition);
        }
        self.composition_range(host).ok_or(ControllerError::SelectionDesync)
    }

    /// Text covered by the active composition (empty while idle).
    pub fn composing_text<H: Host + ?Sized>(&self, host: &H) -> String {
        let Some(range) = self.composition_range(host) else {
            return String::new();
        };
        let text = OffsetTranslator::new(host).plain_text();
        utf16::slice(&text, range.start(), range.end()).to_string()
    }

    /// Current selection in plain-text offsets.
    pub fn selection_offsets<H: Host + ?Sized>(&self, host: &H) -> Option<PlainTextRange> {
        let selection = host.selection()?;
        OffsetTranslator::new(host).to_plain_text_range(selection)
    }

    /// Select `range` (clamped to the text length).
    pub fn set_selection_offsets<H: Host + ?Sized>(
        &self,
        host: &mut H,
        range: PlainTextRange,
    ) -> bool {
        let result = Self::document(host).and_then(|document| Self::select(host, range, document));
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("set_selection_offsets({}) failed: {}", range, err);
                false
            }
        }
    }

    fn select<H: Host + ?Sized>(
        host: &mut H,
        range: PlainTextRange,
        document: DocumentId,
    ) -> Result<()> {
        let host_range = OffsetTranslator::new(&*host)
            .to_host_range(range)
            .ok_or(ControllerError::RangeUnresolvable)?;
        host.select_range(host_range);
        Self::check_available(host, document)
    }

    /// Value, selection and composition bounds of the editable scope.
    pub fn text_input_snapshot<H: Host + ?Sized>(&self, host: &H) -> Option<TextInputSnapshot> {
        if !host.is_available() {
            return None;
        }
        let selection = self.selection_offsets(host).unwrap_or_default();
        let composition = self.composition_range(host);
        Some(TextInputSnapshot {
            value: OffsetTranslator::new(host).plain_text(),
            selection_start: selection.start(),
            selection_end: selection.end(),
            composition_start: composition.map(|range| range.start()),
            composition_end: composition.map(|range| range.end()),
        })
    }

    /// The document was torn down: forget the composition without touching
    /// the host.
    pub fn document_detached(&mut self) {
        if self.state.take().is_some() {
            debug!("document detached, composition dropped");
        }
    }

    /// Release the span and its markers and return to idle.
    fn clear<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(span) = self.state.take() {
            host.release_anchor(span.start);
            host.release_anchor(span.end);
            host.clear_markers();
            trace!("composition span released");
        }
    }

    /// Markers to apply for a composition of `len` units.
    fn effective_decorations(
        &self,
        given: &[DecorationMarker],
        len: usize,
        allow_default: bool,
    ) -> Vec<DecorationMarker> {
        if !given.is_empty() || !allow_default {
            return given.to_vec();
        }
        self.config
            .default_decoration
            .map(|style| vec![style.marker_over(len)])
            .unwrap_or_default()
    }

    /// Anchor a new span over `range`, replacing any previous one.
    fn anchor_span<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        range: PlainTextRange,
        is_dirty: bool,
        decorations: Vec<DecorationMarker>,
    ) -> Result<()> {
        let translator = OffsetTranslator::new(&*host);
        let start = translator
            .position_at(range.start(), Affinity::Downstream)
            .ok_or(ControllerError::RangeUnresolvable)?;
        let end = translator
            .position_at(range.end(), Affinity::Upstream)
            .ok_or(ControllerError::RangeUnresolvable)?;

        if let Some(old) = self.state.take() {
            host.release_anchor(old.start);
            host.release_anchor(old.end);
        }
        let span = CompositionSpan {
            start: host.create_anchor(start),
            end: host.create_anchor(end),
            is_dirty,
        };
        self.state = CompositionState::Composing {
            span,
            decorations: Vec::new(),
        };
        self.set_decorations(host, range, decorations);
        Ok(())
    }

    /// Replace the markers over the composition at `range`.
    fn set_decorations<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        range: PlainTextRange,
        decorations: Vec<DecorationMarker>,
    ) {
        host.clear_markers();
        for marker in &decorations {
            let Some(absolute) = marker.resolve(range) else {
                continue;
            };
            if let Some(host_range) = OffsetTranslator::new(&*host).to_host_range(absolute) {
                host.apply_marker(host_range, marker);
            }
        }
        if let CompositionState::Composing {
            decorations: current,
            ..
        } = &mut self.state
        {
            *current = decorations;
        }
    }
}
