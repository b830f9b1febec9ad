//! Starting and updating a composition

use preedit_engine::{CompositionDiff, create_range_for_selection};

use super::*;
use crate::core::translator::DocumentBoundaries;
use crate::host::{CompositionEventKind, InputType};

/// Selection to apply after `set_composition`.
///
/// `selection_start` and `selection_end` are relative to `base`, the start of
/// the replaced range. `right_boundary` is the text length once the new
/// composing text is in place.
pub fn selection_range_for_set_composition(
    base: usize,
    selection_start: i32,
    selection_end: i32,
    right_boundary: usize,
) -> PlainTextRange {
    let base = base as i64;
    create_range_for_selection(
        base + i64::from(selection_start),
        base + i64::from(selection_end),
        right_boundary,
    )
}

impl InputMethodController {
    /// Set the composing text.
    ///
    /// Starts a composition over the selection when idle, otherwise rewrites
    /// only the part of the composition that changed. Empty `text` cancels an
    /// active composition; while idle it deletes a non-collapsed selection
    /// without dispatching events.
    ///
    /// Returns false if the command stopped early.
    pub fn set_composition<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
        decorations: &[DecorationMarker],
        selection_start: i32,
        selection_end: i32,
    ) -> bool {
        let request = CompositionRequest {
            text,
            decorations,
            selection_start,
            selection_end,
        };
        match self.try_set_composition(host, request) {
            Ok(()) => true,
            Err(err) => {
                debug!("set_composition({:?}) stopped: {}", text, err);
                false
            }
        }
    }

    fn try_set_composition<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        request: CompositionRequest<'_>,
    ) -> Result<()> {
        let document = Self::document(host)?;

        if request.text.is_empty() {
            if self.has_composition(host) {
                return self.cancel(host, document);
            }
            self.clear(host);
            return Self::delete_selection_silently(host, document);
        }

        if !self.state.is_idle() && !self.has_composition(host) {
            debug!("composition span went stale, dropping it");
            self.clear(host);
        }

        match self.composition_range(host) {
            Some(range) => self.update_composition(host, document, range, request),
            None => self.start_composition(host, document, request),
        }
    }

    fn delete_selection_silently<H: Host + ?Sized>(
        host: &mut H,
        document: DocumentId,
    ) -> Result<()> {
        let selected = host.selection().is_some_and(|selection| !selection.is_collapsed());
        if selected {
            host.delete_selection();
            Self::check_available(host, document)?;
        }
        Ok(())
    }

    /// Idle -> Composing: replace the selection with `text`.
    fn start_composition<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        document: DocumentId,
        request: CompositionRequest<'_>,
    ) -> Result<()> {
        let selection = self
            .selection_offsets(host)
            .ok_or(ControllerError::RangeUnresolvable)?;
        let replaced = OffsetTranslator::new(&*host)
            .to_host_range(selection)
            .map(|range| host.clone_contents(range))
            .unwrap_or_default();

        host.dispatch_composition(CompositionEventKind::Start, &replaced);
        Self::check_available(host, document)?;
        host.dispatch_before_input(InputType::InsertCompositionText, request.text, false);
        Self::check_available(host, document)?;
        host.dispatch_composition(CompositionEventKind::Update, request.text);
        Self::check_available(host, document)?;

        // listeners may have moved the selection
        let selection = self
            .selection_offsets(host)
            .ok_or(ControllerError::RangeUnresolvable)?;
        let text_len = OffsetTranslator::new(&*host).text_length();
        let new_len = utf16::utf16_len(request.text);
        let caret = selection_range_for_set_composition(
            selection.start(),
            request.selection_start,
            request.selection_end,
            text_len - selection.len() + new_len,
        );

        if !host.insert_text(request.text) {
            return Err(ControllerError::RangeUnresolvable);
        }
        Self::check_available(host, document)?;

        let range = PlainTextRange::from_unordered(selection.start(), selection.start() + new_len);
        let decorations = self.effective_decorations(request.decorations, new_len, true);
        self.anchor_span(host, range, true, decorations)?;
        debug!("composition started at {}", range);

        Self::select(host, caret, document)
    }

    /// Composing -> Composing: rewrite only the changed middle.
    fn update_composition<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        document: DocumentId,
        range: PlainTextRange,
        request: CompositionRequest<'_>,
    ) -> Result<()> {
        let translator = OffsetTranslator::new(&*host);
        let plain = translator.plain_text();
        let composing = utf16::slice(&plain, range.start(), range.end());
        let diff = CompositionDiff::compute(
            composing,
            request.text,
            range.start(),
            &DocumentBoundaries::new(&*host),
        );
        let new_len = utf16::utf16_len(request.text);
        let caret = selection_range_for_set_composition(
            range.start(),
            request.selection_start,
            request.selection_end,
            translator.text_length() - range.len() + new_len,
        );
        let decorations = self.effective_decorations(request.decorations, new_len, true);

        if diff.is_noop() {
            trace!("composing text unchanged");
            self.set_decorations(host, range, decorations);
            return Self::select(host, caret, document);
        }

        Self::select(host, diff.replaced_range(range.start()), document)?;
        host.dispatch_before_input(InputType::InsertCompositionText, request.text, false);
        Self::check_available(host, document)?;
        host.dispatch_composition(CompositionEventKind::Update, request.text);
        Self::check_available(host, document)?;

        if diff.is_inserting() {
            host.insert_text(&diff.inserted);
        } else {
            host.delete_selection();
        }
        Self::check_available(host, document)?;

        // the start anchor has followed any edits made by listeners
        let start = self
            .span_start(host)
            .ok_or(ControllerError::SelectionDesync)?;
        let range = PlainTextRange::from_unordered(start, start + new_len);
        self.anchor_span(host, range, true, decorations)?;
        trace!("composition updated to {}", range);

        Self::select(host, caret, document)
    }

    /// Mark `[start, end)` of the existing text as the composition.
    ///
    /// Nothing is inserted or deleted and no events are dispatched. Fails if
    /// the range is inverted, collapsed or past the end of the text.
    pub fn set_composition_from_existing_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        decorations: &[DecorationMarker],
        start: usize,
        end: usize,
    ) -> bool {
        match self.try_set_composition_from_existing_text(host, decorations, start, end) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    "set_composition_from_existing_text({}, {}) failed: {}",
                    start, end, err
                );
                false
            }
        }
    }

    fn try_set_composition_from_existing_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        decorations: &[DecorationMarker],
        start: usize,
        end: usize,
    ) -> Result<()> {
        Self::document(host)?;
        let range =
            PlainTextRange::new(start, end).map_err(|_| ControllerError::RangeUnresolvable)?;
        if range.is_collapsed() || range.end() > OffsetTranslator::new(&*host).text_length() {
            return Err(ControllerError::RangeUnresolvable);
        }

        self.clear(host);
        self.anchor_span(host, range, false, decorations.to_vec())?;
        debug!("composition set from existing text {}", range);
        Ok(())
    }
}
