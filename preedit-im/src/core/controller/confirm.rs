//! Confirming and cancelling a composition

use preedit_engine::absolute_caret_position;

use super::*;
use crate::host::{CompositionEventKind, DispatchOutcome, InputType};

impl InputMethodController {
    /// Commit the composing text as-is.
    ///
    /// With `keep_selection` the selection from before the commit is put
    /// back; otherwise the caret moves to the end of the committed text.
    /// Returns false when there is no active composition.
    pub fn finish_composing_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        keep_selection: bool,
    ) -> bool {
        match self.try_finish_composing_text(host, keep_selection) {
            Ok(()) => true,
            Err(err) => {
                debug!("finish_composing_text stopped: {}", err);
                false
            }
        }
    }

    fn try_finish_composing_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        keep_selection: bool,
    ) -> Result<()> {
        let document = Self::document(host)?;
        let range = self.require_composition(host)?;
        let composing = self.composing_text(host);

        if keep_selection {
            let selection = self
                .selection_offsets(host)
                .ok_or(ControllerError::RangeUnresolvable)?;
            self.replace_composition(host, document, &composing)?;
            return Self::select(host, selection, document);
        }

        self.replace_composition(host, document, &composing)?;
        let caret = range.start() + utf16::utf16_len(&composing);
        Self::select(host, PlainTextRange::collapsed(caret), document)
    }

    /// Insert `text` and move the caret `relative_caret` units from its end.
    ///
    /// An active composition is replaced by `text` and confirmed. While idle
    /// the text goes in at the selection after a cancelable `beforeinput`.
    pub fn commit_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
        relative_caret: i32,
    ) -> bool {
        match self.try_commit_text(host, text, relative_caret) {
            Ok(()) => true,
            Err(err) => {
                debug!("commit_text({:?}) stopped: {}", text, err);
                false
            }
        }
    }

    fn try_commit_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        text: &str,
        relative_caret: i32,
    ) -> Result<()> {
        let document = Self::document(host)?;
        let text_len = utf16::utf16_len(text);

        if let Some(range) = self.composition_range(host) {
            self.replace_composition(host, document, text)?;
            let caret = absolute_caret_position(range.start(), text_len, relative_caret);
            return Self::move_caret_to(host, document, caret);
        }

        self.clear(host);
        if text.is_empty() && relative_caret == 0 {
            return Ok(());
        }

        let selection = self
            .selection_offsets(host)
            .ok_or(ControllerError::RangeUnresolvable)?;
        if !text.is_empty() {
            let outcome = host.dispatch_before_input(InputType::InsertText, text, true);
            Self::check_available(host, document)?;
            if outcome == DispatchOutcome::Cancelled {
                return Err(ControllerError::Cancelled);
            }
            host.insert_text(text);
            Self::check_available(host, document)?;
        }

        let caret = absolute_caret_position(selection.start(), text_len, relative_caret);
        Self::move_caret_to(host, document, caret)
    }

    /// Remove the composing text without committing it.
    ///
    /// Returns false when there is no active composition.
    pub fn cancel_composition<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let result = Self::document(host).and_then(|document| self.cancel(host, document));
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("cancel_composition stopped: {}", err);
                false
            }
        }
    }

    pub(super) fn cancel<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        document: DocumentId,
    ) -> Result<()> {
        let range = self.require_composition(host)?;
        Self::select(host, range, document)?;
        self.clear(host);

        host.dispatch_before_input(InputType::DeleteCompositionText, "", false);
        Self::check_available(host, document)?;
        host.dispatch_composition(CompositionEventKind::Update, "");
        Self::check_available(host, document)?;
        host.delete_selection();
        Self::check_available(host, document)?;
        host.dispatch_composition(CompositionEventKind::End, "");
        Self::check_available(host, document)?;

        debug!("composition cancelled");
        Ok(())
    }

    /// Focus is about to leave the editable scope: commit the composition.
    pub fn will_change_focus<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.has_composition(host) {
            self.clear(host);
            return false;
        }
        let keep_selection = self.config.keep_selection_on_focus_change;
        self.finish_composing_text(host, keep_selection)
    }

    /// The active composition; a stale span is released on the way out.
    fn require_composition<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<PlainTextRange> {
        match self.active_composition(host) {
            Ok(range) => Ok(range),
            Err(err) => {
                self.clear(host);
                Err(err)
            }
        }
    }

    /// Composing -> Idle: write `text` over the composition and end it.
    ///
    /// When `text` equals the composing text and the span was never written
    /// by the controller, the document is left untouched.
    fn replace_composition<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        document: DocumentId,
        text: &str,
    ) -> Result<()> {
        let range = self.require_composition(host)?;

        if !self.state.is_dirty() && self.composing_text(host) == text {
            self.clear(host);
            host.dispatch_composition(CompositionEventKind::End, text);
            debug!("composition confirmed unchanged");
            return Self::check_available(host, document);
        }

        Self::select(host, range, document)?;
        self.clear(host);

        host.dispatch_before_input(InputType::InsertFromComposition, text, false);
        Self::check_available(host, document)?;
        host.dispatch_composition(CompositionEventKind::Update, text);
        Self::check_available(host, document)?;
        if text.is_empty() {
            host.delete_selection();
        } else {
            host.insert_text(text);
        }
        Self::check_available(host, document)?;
        host.dispatch_composition(CompositionEventKind::End, text);
        Self::check_available(host, document)?;

        debug!("composition confirmed as {:?}", text);
        Ok(())
    }
}
