//! In-memory host
//!
//! A flat list of text nodes with a selection, anchors and markers, plus an
//! event dispatcher with scriptable listeners. Listeners receive the document
//! by `&mut` and may edit it, detach it or swap it out while an event is
//! being dispatched. Used by the test suites and the replay tool.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use preedit_engine::{PlainTextRange, TextBoundaries, utf16};
use serde::Serialize;
use tracing::trace;

use super::{
    AnchorId, CompositionEventKind, DispatchOutcome, DocumentId, EventDispatch, HostDocument,
    HostPosition, HostRange, InputType, MarkerSink, NodeId, PersistentRanges,
};
use crate::core::decoration::DecorationMarker;
use crate::core::translator::{Affinity, OffsetTranslator};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
struct MemoryNode {
    id: NodeId,
    text: String,
}

/// A marker as applied to the document, in plain-text offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMarker {
    pub range: PlainTextRange,
    pub marker: DecorationMarker,
}

/// An editable scope held in memory.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    id: DocumentId,
    available: bool,
    nodes: Vec<MemoryNode>,
    selection: Option<HostRange>,
    anchors: BTreeMap<AnchorId, HostPosition>,
    markers: Vec<AppliedMarker>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single text node holding `text`, caret at the end.
    pub fn from_text(text: &str) -> Self {
        Self::from_nodes(&[text])
    }

    /// One text node per entry, caret at the end of the last one.
    pub fn from_nodes(texts: &[&str]) -> Self {
        let mut nodes: Vec<MemoryNode> = texts
            .iter()
            .map(|text| MemoryNode {
                id: NodeId(next_id()),
                text: (*text).to_string(),
            })
            .collect();
        if nodes.is_empty() {
            nodes.push(MemoryNode {
                id: NodeId(next_id()),
                text: String::new(),
            });
        }
        let mut doc = Self {
            id: DocumentId(next_id()),
            available: true,
            nodes,
            selection: None,
            anchors: BTreeMap::new(),
            markers: Vec::new(),
        };
        let len = doc.len();
        doc.set_caret(len);
        doc
    }

    /// Full text of the document.
    pub fn text(&self) -> String {
        self.nodes.iter().map(|n| n.text.as_str()).collect()
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| utf16::utf16_len(&n.text)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selection in plain-text offsets.
    pub fn selection_offsets(&self) -> Option<PlainTextRange> {
        let selection = self.selection?;
        OffsetTranslator::new(self).to_plain_text_range(selection)
    }

    /// Collapse the selection at `offset`.
    pub fn set_caret(&mut self, offset: usize) {
        self.select(offset, offset);
    }

    /// Select `[start, end)` in plain-text offsets.
    pub fn select(&mut self, start: usize, end: usize) {
        let range = PlainTextRange::from_unordered(start, end);
        if let Some(range) = OffsetTranslator::new(&*self).to_host_range(range) {
            self.select_range(range);
        }
    }

    pub fn markers(&self) -> &[AppliedMarker] {
        &self.markers
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Make the document unavailable, as if its frame was torn down.
    pub fn detach(&mut self) {
        self.available = false;
        self.selection = None;
    }

    /// Replace the whole document with a new one, as if the host navigated.
    pub fn swap_document(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    /// Insert `text` at a plain-text offset, as a script editing the
    /// document would. Anchors and the selection after it shift.
    pub fn insert_at_offset(&mut self, offset: usize, text: &str) {
        let position = OffsetTranslator::new(&*self).position_at(offset, Affinity::Upstream);
        if let Some(position) = position {
            self.insert_at(position, text);
        }
    }

    /// Remove `[start, end)` in plain-text offsets.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        let range = PlainTextRange::from_unordered(start, end);
        if let Some(range) = OffsetTranslator::new(&*self).to_host_range(range) {
            self.remove_between(range.start, range.end);
        }
    }

    /// Remove a text node. Positions inside it move to the removal point.
    pub fn remove_node(&mut self, node: NodeId) {
        let Some(index) = self.node_index(node) else {
            return;
        };
        self.nodes.remove(index);
        let replacement = if index > 0 {
            let prev = &self.nodes[index - 1];
            Some(HostPosition::new(prev.id, utf16::utf16_len(&prev.text)))
        } else {
            self.nodes.first().map(|next| HostPosition::new(next.id, 0))
        };
        self.adjust_positions(|p| if p.node == node { replacement } else { Some(p) });
    }

    fn node_index(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == node)
    }

    fn order_key(&self, position: HostPosition) -> Option<(usize, usize)> {
        Some((self.node_index(position.node)?, position.offset))
    }

    /// Apply `f` to every tracked position. `None` disconnects it.
    fn adjust_positions(&mut self, mut f: impl FnMut(HostPosition) -> Option<HostPosition>) {
        self.anchors = std::mem::take(&mut self.anchors)
            .into_iter()
            .filter_map(|(id, p)| f(p).map(|p| (id, p)))
            .collect();
        self.selection = self
            .selection
            .and_then(|s| Some(HostRange::new(f(s.start)?, f(s.end)?)));
    }

    fn insert_at(&mut self, position: HostPosition, text: &str) {
        let Some(index) = self.node_index(position.node) else {
            return;
        };
        let node = &mut self.nodes[index];
        let byte = utf16::to_byte_offset(&node.text, position.offset);
        let at = utf16::from_byte_offset(&node.text, byte);
        node.text.insert_str(byte, text);
        let len = utf16::utf16_len(text);
        let id = node.id;
        self.adjust_positions(|p| {
            if p.node == id && p.offset > at {
                Some(HostPosition::new(id, p.offset + len))
            } else {
                Some(p)
            }
        });
    }

    fn remove_between(&mut self, start: HostPosition, end: HostPosition) {
        let (Some(from), Some(to)) = (self.order_key(start), self.order_key(end)) else {
            return;
        };
        let (start, end, from, to) = if from <= to {
            (start, end, from, to)
        } else {
            (end, start, to, from)
        };

        if from.0 == to.0 {
            let node = &mut self.nodes[from.0];
            let a = utf16::to_byte_offset(&node.text, start.offset);
            let b = utf16::to_byte_offset(&node.text, end.offset);
            node.text.replace_range(a..b, "");
            let removed = end.offset - start.offset;
            let id = node.id;
            self.adjust_positions(|p| {
                if p.node != id || p.offset <= start.offset {
                    Some(p)
                } else if p.offset <= end.offset {
                    Some(start)
                } else {
                    Some(HostPosition::new(id, p.offset - removed))
                }
            });
            return;
        }

        let head = &mut self.nodes[from.0];
        let cut = utf16::to_byte_offset(&head.text, start.offset);
        head.text.truncate(cut);
        for node in &mut self.nodes[from.0 + 1..to.0] {
            node.text.clear();
        }
        let tail = &mut self.nodes[to.0];
        let cut = utf16::to_byte_offset(&tail.text, end.offset);
        tail.text.replace_range(..cut, "");

        let middle: Vec<NodeId> = self.nodes[from.0 + 1..to.0].iter().map(|n| n.id).collect();
        let (head_id, tail_id) = (start.node, end.node);
        self.adjust_positions(|p| {
            if (p.node == head_id && p.offset > start.offset)
                || middle.contains(&p.node)
                || (p.node == tail_id && p.offset <= end.offset)
            {
                Some(start)
            } else if p.node == tail_id {
                Some(HostPosition::new(tail_id, p.offset - end.offset))
            } else {
                Some(p)
            }
        });
    }
}

impl HostDocument for MemoryDocument {
    fn is_available(&self) -> bool {
        self.available
    }

    fn document_id(&self) -> Option<DocumentId> {
        self.available.then_some(self.id)
    }

    fn text_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    fn node_text(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.id == node)
            .map(|n| n.text.as_str())
    }

    fn selection(&self) -> Option<HostRange> {
        if !self.available {
            return None;
        }
        self.selection
    }

    /// Canonicalizes like a visible selection: a range shrinks inward to
    /// grapheme boundaries and collapses if nothing is left; a caret moves
    /// to the boundary on its left.
    fn select_range(&mut self, range: HostRange) {
        if !self.available {
            return;
        }
        let translator = OffsetTranslator::new(&*self);
        let (Some(a), Some(b)) = (
            translator.to_plain_text_offset(range.start),
            translator.to_plain_text_offset(range.end),
        ) else {
            return;
        };
        let (start, end) = (a.min(b), a.max(b));
        let boundaries = TextBoundaries::new(&translator.plain_text());
        let canonical = if start == end {
            PlainTextRange::collapsed(boundaries.left_boundary(start))
        } else {
            let s = boundaries.right_boundary(start);
            let e = boundaries.left_boundary(end);
            if s >= e {
                PlainTextRange::collapsed(s)
            } else {
                PlainTextRange::from_unordered(s, e)
            }
        };
        trace!("select [{}, {}) -> {}", start, end, canonical);
        if let Some(range) = translator.to_host_range(canonical) {
            self.selection = Some(range);
        }
    }

    fn delete_selection(&mut self) -> bool {
        let Some(selection) = self.selection() else {
            return false;
        };
        if selection.is_collapsed() {
            return false;
        }
        self.remove_between(selection.start, selection.end);
        self.selection = Some(HostRange::collapsed(selection.start));
        true
    }

    fn insert_text(&mut self, text: &str) -> bool {
        let Some(selection) = self.selection() else {
            return false;
        };
        if !selection.is_collapsed() {
            self.remove_between(selection.start, selection.end);
        }
        let at = selection.start;
        self.insert_at(at, text);
        let caret = HostPosition::new(at.node, at.offset + utf16::utf16_len(text));
        self.selection = Some(HostRange::collapsed(caret));
        true
    }
}

impl PersistentRanges for MemoryDocument {
    fn create_anchor(&mut self, position: HostPosition) -> AnchorId {
        let id = AnchorId(next_id());
        if self.node_index(position.node).is_some() {
            self.anchors.insert(id, position);
        }
        id
    }

    fn anchor_position(&self, anchor: AnchorId) -> Option<HostPosition> {
        if !self.available {
            return None;
        }
        self.anchors.get(&anchor).copied()
    }

    fn release_anchor(&mut self, anchor: AnchorId) {
        self.anchors.remove(&anchor);
    }
}

impl MarkerSink for MemoryDocument {
    fn apply_marker(&mut self, range: HostRange, marker: &DecorationMarker) {
        if let Some(range) = OffsetTranslator::new(&*self).to_plain_text_range(range) {
            self.markers.push(AppliedMarker {
                range,
                marker: marker.clone(),
            });
        }
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

/// Something observable that happened in a [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    BeforeInput {
        input_type: InputType,
        data: String,
        cancelable: bool,
    },
    Composition {
        kind: CompositionEventKind,
        data: String,
    },
    Inserted {
        offset: usize,
        text: String,
    },
    Deleted {
        offset: usize,
        text: String,
    },
}

impl HostEvent {
    /// True for events that changed the document text.
    pub fn is_mutation(&self) -> bool {
        matches!(self, HostEvent::Inserted { .. } | HostEvent::Deleted { .. })
    }
}

/// An event listener. Returning [`DispatchOutcome::Cancelled`] cancels a
/// cancelable event.
pub type Listener = Box<dyn FnMut(&mut MemoryDocument, &HostEvent) -> DispatchOutcome>;

/// A [`MemoryDocument`] with event dispatch and an event log.
#[derive(Default)]
pub struct MemoryHost {
    pub doc: MemoryDocument,
    listeners: Vec<Listener>,
    log: Vec<HostEvent>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self::with_document(MemoryDocument::from_text(text))
    }

    pub fn with_document(doc: MemoryDocument) -> Self {
        Self {
            doc,
            listeners: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Register a listener for `beforeinput` and composition events.
    pub fn add_listener(
        &mut self,
        listener: impl FnMut(&mut MemoryDocument, &HostEvent) -> DispatchOutcome + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    pub fn log(&self) -> &[HostEvent] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.log)
    }

    /// Number of text mutations recorded so far.
    pub fn mutation_count(&self) -> usize {
        self.log.iter().filter(|e| e.is_mutation()).count()
    }

    fn notify(&mut self, event: &HostEvent) -> DispatchOutcome {
        self.log.push(event.clone());
        if !self.doc.is_available() {
            return DispatchOutcome::NotCancelled;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        let mut outcome = DispatchOutcome::NotCancelled;
        for listener in listeners.iter_mut() {
            if listener(&mut self.doc, event) == DispatchOutcome::Cancelled {
                outcome = DispatchOutcome::Cancelled;
            }
        }
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
        outcome
    }

    fn selected_text(&self) -> (usize, String) {
        match self.doc.selection() {
            Some(selection) => {
                let offset = self.doc.selection_offsets().map_or(0, |r| r.start());
                (offset, self.doc.clone_contents(selection))
            }
            None => (0, String::new()),
        }
    }
}

impl HostDocument for MemoryHost {
    fn is_available(&self) -> bool {
        self.doc.is_available()
    }

    fn document_id(&self) -> Option<DocumentId> {
        self.doc.document_id()
    }

    fn text_nodes(&self) -> Vec<NodeId> {
        self.doc.text_nodes()
    }

    fn node_text(&self, node: NodeId) -> Option<&str> {
        self.doc.node_text(node)
    }

    fn selection(&self) -> Option<HostRange> {
        self.doc.selection()
    }

    fn select_range(&mut self, range: HostRange) {
        self.doc.select_range(range);
    }

    fn delete_selection(&mut self) -> bool {
        let (offset, removed) = self.selected_text();
        if !self.doc.delete_selection() {
            return false;
        }
        self.log.push(HostEvent::Deleted {
            offset,
            text: removed,
        });
        true
    }

    fn insert_text(&mut self, text: &str) -> bool {
        let (offset, removed) = self.selected_text();
        if !self.doc.insert_text(text) {
            return false;
        }
        if !removed.is_empty() {
            self.log.push(HostEvent::Deleted {
                offset,
                text: removed,
            });
        }
        if !text.is_empty() {
            self.log.push(HostEvent::Inserted {
                offset,
                text: text.to_string(),
            });
        }
        true
    }
}

impl PersistentRanges for MemoryHost {
    fn create_anchor(&mut self, position: HostPosition) -> AnchorId {
        self.doc.create_anchor(position)
    }

    fn anchor_position(&self, anchor: AnchorId) -> Option<HostPosition> {
        self.doc.anchor_position(anchor)
    }

    fn release_anchor(&mut self, anchor: AnchorId) {
        self.doc.release_anchor(anchor);
    }
}

impl EventDispatch for MemoryHost {
    fn dispatch_before_input(
        &mut self,
        input_type: InputType,
        data: &str,
        cancelable: bool,
    ) -> DispatchOutcome {
        let outcome = self.notify(&HostEvent::BeforeInput {
            input_type,
            data: data.to_string(),
            cancelable,
        });
        if cancelable {
            outcome
        } else {
            DispatchOutcome::NotCancelled
        }
    }

    fn dispatch_composition(&mut self, kind: CompositionEventKind, data: &str) {
        self.notify(&HostEvent::Composition {
            kind,
            data: data.to_string(),
        });
    }
}

impl MarkerSink for MemoryHost {
    fn apply_marker(&mut self, range: HostRange, marker: &DecorationMarker) {
        self.doc.apply_marker(range, marker);
    }

    fn clear_markers(&mut self) {
        self.doc.clear_markers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_selection() {
        let mut host = MemoryHost::with_text("hello world");
        host.doc.select(6, 11);
        assert!(host.insert_text("there"));
        assert_eq!(host.text(), "hello there");
        assert_eq!(host.doc.selection_offsets(), Some(PlainTextRange::collapsed(11)));
        assert_eq!(
            host.log(),
            &[
                HostEvent::Deleted {
                    offset: 6,
                    text: "world".to_string()
                },
                HostEvent::Inserted {
                    offset: 6,
                    text: "there".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_anchor_stays_before_insertion_at_its_offset() {
        let mut doc = MemoryDocument::from_text("abcd");
        let node = doc.text_nodes()[0];
        let at = doc.create_anchor(HostPosition::new(node, 2));
        let after = doc.create_anchor(HostPosition::new(node, 3));

        doc.insert_at_offset(2, "XY");
        assert_eq!(doc.text(), "abXYcd");
        assert_eq!(doc.anchor_position(at).map(|p| p.offset), Some(2));
        assert_eq!(doc.anchor_position(after).map(|p| p.offset), Some(5));
    }

    #[test]
    fn test_deletion_collapses_anchors() {
        let mut doc = MemoryDocument::from_text("abcdef");
        let node = doc.text_nodes()[0];
        let inside = doc.create_anchor(HostPosition::new(node, 3));
        let after = doc.create_anchor(HostPosition::new(node, 5));

        doc.remove_range(1, 4);
        assert_eq!(doc.text(), "aef");
        assert_eq!(doc.anchor_position(inside).map(|p| p.offset), Some(1));
        assert_eq!(doc.anchor_position(after).map(|p| p.offset), Some(2));
    }

    #[test]
    fn test_multi_node_deletion() {
        let mut doc = MemoryDocument::from_nodes(&["abc", "def", "ghi"]);
        let nodes = doc.text_nodes();
        let tail = doc.create_anchor(HostPosition::new(nodes[2], 2));

        doc.remove_range(2, 7);
        assert_eq!(doc.text(), "abhi");
        assert_eq!(doc.node_text(nodes[1]), Some(""));
        assert_eq!(
            doc.anchor_position(tail),
            Some(HostPosition::new(nodes[2], 1))
        );
    }

    #[test]
    fn test_selection_is_canonicalized() {
        // "a" + U+1F600 + "b": offsets 1..3 are the emoji
        let mut doc = MemoryDocument::from_text("a\u{1F600}b");
        doc.select(2, 3);
        assert_eq!(doc.selection_offsets(), Some(PlainTextRange::collapsed(3)));
        doc.select(1, 3);
        assert_eq!(doc.selection_offsets(), Some(PlainTextRange::new(1, 3).unwrap()));
        doc.set_caret(2);
        assert_eq!(doc.selection_offsets(), Some(PlainTextRange::collapsed(1)));
    }

    #[test]
    fn test_remove_node_moves_positions() {
        let mut doc = MemoryDocument::from_nodes(&["ab", "cd"]);
        let nodes = doc.text_nodes();
        let anchor = doc.create_anchor(HostPosition::new(nodes[1], 1));
        doc.remove_node(nodes[1]);
        assert_eq!(doc.text(), "ab");
        assert_eq!(
            doc.anchor_position(anchor),
            Some(HostPosition::new(nodes[0], 2))
        );
    }

    #[test]
    fn test_detach_and_swap() {
        let mut doc = MemoryDocument::from_text("abc");
        let id = doc.document_id();
        doc.swap_document("xyz");
        assert_ne!(doc.document_id(), id);
        assert_eq!(doc.text(), "xyz");

        doc.detach();
        assert!(!doc.is_available());
        assert_eq!(doc.document_id(), None);
        assert_eq!(doc.selection(), None);
    }

    #[test]
    fn test_listener_can_cancel_and_mutate() {
        let mut host = MemoryHost::with_text("abc");
        host.add_listener(|doc, event| {
            if let HostEvent::BeforeInput { .. } = event {
                doc.insert_at_offset(0, ">");
                return DispatchOutcome::Cancelled;
            }
            DispatchOutcome::NotCancelled
        });

        let outcome = host.dispatch_before_input(InputType::InsertText, "x", true);
        assert_eq!(outcome, DispatchOutcome::Cancelled);
        assert_eq!(host.text(), ">abc");

        // non-cancelable events ignore the listener's verdict
        let outcome = host.dispatch_before_input(InputType::InsertCompositionText, "x", false);
        assert_eq!(outcome, DispatchOutcome::NotCancelled);
        assert_eq!(host.log().len(), 2);
    }

    #[test]
    fn test_event_log_serializes() {
        let event = HostEvent::BeforeInput {
            input_type: InputType::InsertFromComposition,
            data: "OK".to_string(),
            cancelable: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "before_input");
        assert_eq!(json["input_type"], "insertFromComposition");
        assert_eq!(json["data"], "OK");
        assert_eq!(json["cancelable"], false);
    }
}
