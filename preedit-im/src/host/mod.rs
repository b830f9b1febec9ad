//! Interfaces the controller consumes from the editing host
//!
//! The host owns the document tree, the selection, event dispatch and
//! marker rendering. The controller only reaches it through these traits and
//! takes it by `&mut` on every call; nothing is retained between calls apart
//! from the anchor handles of the composition span.
//!
//! Any method that dispatches an event may run host callbacks that mutate the
//! document, detach the editable scope or tear the document down entirely.

pub mod memory;

use preedit_engine::TextBoundaries;
use serde::{Deserialize, Serialize};

use crate::core::decoration::DecorationMarker;

pub use memory::{HostEvent, MemoryDocument, MemoryHost};

/// A text node inside the editable scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Identity of a loaded document. Changes when the host navigates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// Handle to a host-tracked position that moves as the document is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorId(pub u64);

/// A position inside a text node, in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl HostPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A pair of host positions in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostRange {
    pub start: HostPosition,
    pub end: HostPosition,
}

impl HostRange {
    pub fn new(start: HostPosition, end: HostPosition) -> Self {
        Self { start, end }
    }

    pub fn collapsed(position: HostPosition) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// `inputType` of a `beforeinput` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    InsertText,
    InsertCompositionText,
    InsertFromComposition,
    DeleteCompositionText,
    DeleteContentBackward,
    DeleteContentForward,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::InsertText => "insertText",
            InputType::InsertCompositionText => "insertCompositionText",
            InputType::InsertFromComposition => "insertFromComposition",
            InputType::DeleteCompositionText => "deleteCompositionText",
            InputType::DeleteContentBackward => "deleteContentBackward",
            InputType::DeleteContentForward => "deleteContentForward",
        }
    }
}

/// Kind of composition event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionEventKind {
    Start,
    Update,
    End,
}

impl CompositionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionEventKind::Start => "compositionstart",
            CompositionEventKind::Update => "compositionupdate",
            CompositionEventKind::End => "compositionend",
        }
    }
}

/// Result of dispatching a cancelable event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    NotCancelled,
    Cancelled,
}

/// The editable scope: its text nodes, selection and editing primitives.
pub trait HostDocument {
    /// Whether the document is still attached and editable.
    fn is_available(&self) -> bool;

    /// Identity of the current document, `None` once torn down.
    fn document_id(&self) -> Option<DocumentId>;

    /// Text nodes of the editable scope in document order.
    fn text_nodes(&self) -> Vec<NodeId>;

    /// Text of a node, `None` if the node is not in the scope.
    fn node_text(&self, node: NodeId) -> Option<&str>;

    /// Current selection, `None` if there is none in the scope.
    fn selection(&self) -> Option<HostRange>;

    /// Replace the selection. The host may canonicalize the range (for
    /// example, shrink it so it does not end inside a grapheme cluster).
    fn select_range(&mut self, range: HostRange);

    /// Delete the selected text. Returns false when nothing was deleted.
    fn delete_selection(&mut self) -> bool;

    /// Replace the selection with `text` and leave the caret after it.
    fn insert_text(&mut self, text: &str) -> bool;

    /// Text covered by `range`.
    fn clone_contents(&self, range: HostRange) -> String {
        let nodes = self.text_nodes();
        let Some(first) = nodes.iter().position(|n| *n == range.start.node) else {
            return String::new();
        };
        let mut out = String::new();
        for node in &nodes[first..] {
            let Some(text) = self.node_text(*node) else {
                continue;
            };
            let from = if *node == range.start.node {
                range.start.offset
            } else {
                0
            };
            if *node == range.end.node {
                out.push_str(preedit_engine::utf16::slice(text, from, range.end.offset));
                break;
            }
            out.push_str(preedit_engine::utf16::slice(text, from, usize::MAX));
        }
        out
    }

    /// Nearest grapheme boundary at or before `position`.
    fn left_grapheme_boundary(&self, position: HostPosition) -> Option<HostPosition> {
        let text = self.node_text(position.node)?;
        let offset = TextBoundaries::new(text).left_boundary(position.offset);
        Some(HostPosition::new(position.node, offset))
    }

    /// Nearest grapheme boundary at or after `position`.
    fn right_grapheme_boundary(&self, position: HostPosition) -> Option<HostPosition> {
        let text = self.node_text(position.node)?;
        let offset = TextBoundaries::new(text).right_boundary(position.offset);
        Some(HostPosition::new(position.node, offset))
    }
}

/// Host-tracked positions that survive edits made elsewhere in the document.
///
/// An insertion exactly at an anchor leaves the anchor before the inserted
/// text. A deletion covering an anchor collapses it to the deletion point.
pub trait PersistentRanges {
    fn create_anchor(&mut self, position: HostPosition) -> AnchorId;

    /// Current position of an anchor, `None` once it is disconnected.
    fn anchor_position(&self, anchor: AnchorId) -> Option<HostPosition>;

    fn release_anchor(&mut self, anchor: AnchorId);
}

/// Synchronous event dispatch. Listeners run before these methods return.
pub trait EventDispatch {
    fn dispatch_before_input(
        &mut self,
        input_type: InputType,
        data: &str,
        cancelable: bool,
    ) -> DispatchOutcome;

    fn dispatch_composition(&mut self, kind: CompositionEventKind, data: &str);
}

/// Composition marker rendering.
pub trait MarkerSink {
    fn apply_marker(&mut self, range: HostRange, marker: &DecorationMarker);

    fn clear_markers(&mut self);
}

/// Everything the controller needs from a host.
pub trait Host: HostDocument + PersistentRanges + EventDispatch + MarkerSink {}

impl<T: HostDocument + PersistentRanges + EventDispatch + MarkerSink + ?Sized> Host for T {}
