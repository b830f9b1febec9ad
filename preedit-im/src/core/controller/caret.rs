//! Caret placement

use preedit_engine::create_range_for_selection;

use super::*;

impl InputMethodController {
    /// Collapse the selection at `offset`, clamped to the text.
    pub fn move_caret<H: Host + ?Sized>(&mut self, host: &mut H, offset: i32) -> bool {
        let result = Self::document(host)
            .and_then(|document| Self::move_caret_to(host, document, i64::from(offset)));
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("move_caret({}) failed: {}", offset, err);
                false
            }
        }
    }

    pub(super) fn move_caret_to<H: Host + ?Sized>(
        host: &mut H,
        document: DocumentId,
        offset: i64,
    ) -> Result<()> {
        let text_len = OffsetTranslator::new(&*host).text_length();
        let caret = create_range_for_selection(offset, offset, text_len);
        trace!("move caret to {}", caret.start());
        Self::select(host, caret, document)
    }
}
