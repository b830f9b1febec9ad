//! Tests for the composition controller

use super::*;
use crate::core::decoration::Color;
use crate::host::{
    CompositionEventKind, DispatchOutcome, HostEvent, InputType, MemoryDocument, MemoryHost,
};

mod confirm;

fn range(start: usize, end: usize) -> PlainTextRange {
    PlainTextRange::new(start, end).unwrap()
}

/// Set the composition with the caret at its end.
fn compose(ctrl: &mut InputMethodController, host: &mut MemoryHost, text: &str) -> bool {
    let len = utf16::utf16_len(text) as i32;
    ctrl.set_composition(host, text, &[], len, len)
}

fn selection(host: &MemoryHost) -> (usize, usize) {
    let range = host.doc.selection_offsets().unwrap();
    (range.start(), range.end())
}

fn mutations(host: &MemoryHost) -> Vec<HostEvent> {
    host.log().iter().filter(|e| e.is_mutation()).cloned().collect()
}

fn composition_events(host: &MemoryHost) -> Vec<(CompositionEventKind, String)> {
    host.log()
        .iter()
        .filter_map(|e| match e {
            HostEvent::Composition { kind, data } => Some((*kind, data.clone())),
            _ => None,
        })
        .collect()
}

fn inserted(offset: usize, text: &str) -> HostEvent {
    HostEvent::Inserted {
        offset,
        text: text.to_string(),
    }
}

fn deleted(offset: usize, text: &str) -> HostEvent {
    HostEvent::Deleted {
        offset,
        text: text.to_string(),
    }
}

fn before_input(input_type: InputType, data: &str, cancelable: bool) -> HostEvent {
    HostEvent::BeforeInput {
        input_type,
        data: data.to_string(),
        cancelable,
    }
}

fn composition(kind: CompositionEventKind, data: &str) -> HostEvent {
    HostEvent::Composition {
        kind,
        data: data.to_string(),
    }
}
