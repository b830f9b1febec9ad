//! Plain-text offsets <-> host positions
//!
//! Plain-text offsets count UTF-16 code units from the start of the editable
//! scope, across all of its text nodes. Offsets past the end are clamped to
//! the text length before they are resolved.

use preedit_engine::{BoundaryQuery, PlainTextRange, utf16};
use tracing::trace;

use crate::host::{HostDocument, HostPosition, HostRange, NodeId};

/// Which node an offset on a node boundary resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// End of the preceding node
    Upstream,
    /// Start of the following node
    Downstream,
}

/// Read-only view of a host document in plain-text offsets.
pub struct OffsetTranslator<'h, H: HostDocument + ?Sized> {
    host: &'h H,
}

impl<'h, H: HostDocument + ?Sized> OffsetTranslator<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// Node texts in document order, empty when the host is unavailable.
    fn texts(&self) -> impl Iterator<Item = (NodeId, &'h str)> {
        let host = self.host;
        let nodes = if host.is_available() {
            host.text_nodes()
        } else {
            Vec::new()
        };
        nodes
            .into_iter()
            .filter_map(move |node| host.node_text(node).map(|text| (node, text)))
    }

    /// Length of the scope's text in UTF-16 code units.
    pub fn text_length(&self) -> usize {
        self.texts().map(|(_, text)| utf16::utf16_len(text)).sum()
    }

    /// Text of the whole scope.
    pub fn plain_text(&self) -> String {
        self.texts().map(|(_, text)| text).collect()
    }

    /// Plain-text offset of a host position.
    pub fn to_plain_text_offset(&self, position: HostPosition) -> Option<usize> {
        let mut consumed = 0;
        for (node, text) in self.texts() {
            let len = utf16::utf16_len(text);
            if node == position.node {
                return Some(consumed + position.offset.min(len));
            }
            consumed += len;
        }
        trace!("position {:?} is outside the editable scope", position);
        None
    }

    pub fn to_plain_text_range(&self, range: HostRange) -> Option<PlainTextRange> {
        let start = self.to_plain_text_offset(range.start)?;
        let end = self.to_plain_text_offset(range.end)?;
        PlainTextRange::new(start, end).ok()
    }

    /// Host position of a plain-text offset, clamped to the text length.
    ///
    /// Returns `None` when the scope has no text nodes.
    pub fn position_at(&self, offset: usize, affinity: Affinity) -> Option<HostPosition> {
        let mut consumed = 0;
        let mut last = None;
        for (node, text) in self.texts() {
            let end = consumed + utf16::utf16_len(text);
            let inside = match affinity {
                Affinity::Upstream => offset <= end,
                Affinity::Downstream => offset < end,
            };
            if inside {
                return Some(HostPosition::new(node, offset.saturating_sub(consumed)));
            }
            consumed = end;
            last = Some(HostPosition::new(node, utf16::utf16_len(text)));
        }
        last
    }

    /// Host range of a plain-text range.
    ///
    /// A non-collapsed range starts downstream and ends upstream so it does
    /// not pick up empty neighbouring nodes; a caret resolves upstream.
    pub fn to_host_range(&self, range: PlainTextRange) -> Option<HostRange> {
        let range = range.clamp_to(self.text_length());
        if range.is_collapsed() {
            let position = self.position_at(range.start(), Affinity::Upstream)?;
            return Some(HostRange::collapsed(position));
        }
        let start = self.position_at(range.start(), Affinity::Downstream)?;
        let end = self.position_at(range.end(), Affinity::Upstream)?;
        Some(HostRange::new(start, end))
    }
}

/// Grapheme boundary queries against the live document.
pub struct DocumentBoundaries<'h, H: HostDocument + ?Sized> {
    host: &'h H,
}

impl<'h, H: HostDocument + ?Sized> DocumentBoundaries<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }
}

impl<H: HostDocument + ?Sized> BoundaryQuery for DocumentBoundaries<'_, H> {
    fn distance_to_left_boundary(&self, offset: usize) -> Option<usize> {
        let translator = OffsetTranslator::new(self.host);
        if offset > translator.text_length() {
            return None;
        }
        let position = translator.position_at(offset, Affinity::Upstream)?;
        let boundary = self.host.left_grapheme_boundary(position)?;
        let boundary = translator.to_plain_text_offset(boundary)?;
        Some(offset.saturating_sub(boundary))
    }

    fn distance_to_right_boundary(&self, offset: usize) -> Option<usize> {
        let translator = OffsetTranslator::new(self.host);
        if offset > translator.text_length() {
            return None;
        }
        let position = translator.position_at(offset, Affinity::Downstream)?;
        let boundary = self.host.right_grapheme_boundary(position)?;
        let boundary = translator.to_plain_text_offset(boundary)?;
        Some(boundary.saturating_sub(offset))
    }
}
