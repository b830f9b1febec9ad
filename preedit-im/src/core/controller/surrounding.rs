//! Deleting text around the selection

use preedit_engine::BoundaryQuery;

use super::*;
use crate::core::translator::DocumentBoundaries;
use crate::host::{DispatchOutcome, InputType};

impl InputMethodController {
    /// Extend the selection `before` units backward and `after` units
    /// forward, then delete it.
    ///
    /// When the host collapses the extended selection because it would end
    /// inside a grapheme cluster, the backward extension grows one unit at a
    /// time until something is selected or it runs past the text start.
    pub fn extend_selection_and_delete<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        before: usize,
        after: usize,
    ) -> bool {
        match self.try_extend_selection_and_delete(host, before, after) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    "extend_selection_and_delete({}, {}) stopped: {}",
                    before, after, err
                );
                false
            }
        }
    }

    fn try_extend_selection_and_delete<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        before: usize,
        after: usize,
    ) -> Result<()> {
        let document = Self::document(host)?;
        let selection = self
            .selection_offsets(host)
            .ok_or(ControllerError::RangeUnresolvable)?;

        let mut before = before;
        loop {
            let extended = PlainTextRange::from_unordered(
                selection.start().saturating_sub(before),
                selection.end().saturating_add(after),
            );
            Self::select(host, extended, document)?;
            if before == 0 {
                break;
            }
            if self
                .selection_offsets(host)
                .is_some_and(|range| !range.is_collapsed())
            {
                break;
            }
            before = before.saturating_add(1);
            if before > selection.start() {
                break;
            }
        }

        let extended = self
            .selection_offsets(host)
            .ok_or(ControllerError::RangeUnresolvable)?;
        if extended.is_collapsed() {
            trace!("nothing to delete around {}", selection);
            return Ok(());
        }
        if !Self::delete_step(host, document, InputType::DeleteContentBackward)? {
            return Err(ControllerError::Cancelled);
        }
        Ok(())
    }

    /// Delete up to `before` units before the selection and up to `after`
    /// units after it, each widened to whole grapheme clusters. The selection
    /// is restored (shifted by what was deleted before it).
    pub fn delete_surrounding_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        before: usize,
        after: usize,
    ) -> bool {
        match self.try_delete_surrounding_text(host, before, after) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    "delete_surrounding_text({}, {}) stopped: {}",
                    before, after, err
                );
                false
            }
        }
    }

    fn try_delete_surrounding_text<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        before: usize,
        after: usize,
    ) -> Result<()> {
        let document = Self::document(host)?;
        let selection = self
            .selection_offsets(host)
            .ok_or(ControllerError::RangeUnresolvable)?;
        let mut selection_start = selection.start();
        let mut selection_end = selection.end();

        if before > 0 && selection_start > 0 {
            let start = selection_start - before.min(selection_start);
            let adjusted = start
                - DocumentBoundaries::new(&*host)
                    .distance_to_left_boundary(start)
                    .unwrap_or(0)
                    .min(start);
            Self::select(
                host,
                PlainTextRange::from_unordered(adjusted, selection_start),
                document,
            )?;
            if Self::delete_step(host, document, InputType::DeleteContentBackward)? {
                selection_end -= selection_start - adjusted;
                selection_start = adjusted;
            }
        }

        if after > 0 {
            let text_len = OffsetTranslator::new(&*host).text_length();
            let end = selection_end.saturating_add(after).min(text_len);
            let adjusted = end
                + DocumentBoundaries::new(&*host)
                    .distance_to_right_boundary(end)
                    .unwrap_or(0);
            Self::select(
                host,
                PlainTextRange::from_unordered(selection_end, adjusted),
                document,
            )?;
            Self::delete_step(host, document, InputType::DeleteContentForward)?;
        }

        Self::select(
            host,
            PlainTextRange::from_unordered(selection_start, selection_end),
            document,
        )
    }

    /// Delete the current selection after a cancelable `beforeinput`.
    ///
    /// Returns false when there was nothing to delete or the event was
    /// cancelled.
    fn delete_step<H: Host + ?Sized>(
        host: &mut H,
        document: DocumentId,
        input_type: InputType,
    ) -> Result<bool> {
        if host.selection().is_none_or(|selection| selection.is_collapsed()) {
            return Ok(false);
        }
        let outcome = host.dispatch_before_input(input_type, "", true);
        Self::check_available(host, document)?;
        if outcome == DispatchOutcome::Cancelled {
            debug!("{} cancelled by the host", input_type.as_str());
            return Ok(false);
        }
        let deleted = host.delete_selection();
        Self::check_available(host, document)?;
        Ok(deleted)
    }
}
