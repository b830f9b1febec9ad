//! preedit-im: composition controller for input methods
//!
//! This crate mediates between an input method and an editable text surface.
//! It owns the composition state machine and drives the host document through
//! the traits in [`host`], using preedit-engine for offset arithmetic and
//! grapheme-safe diffs.

pub mod config;
pub mod core;
pub mod host;
pub mod logging;

pub use config::Settings;
pub use core::controller::{ControllerConfig, InputMethodController, TextInputSnapshot};
pub use core::decoration::{Color, DecorationMarker, DecorationStyle};
pub use core::error::{ControllerError, Result};
pub use core::state::CompositionState;
pub use core::translator::{Affinity, DocumentBoundaries, OffsetTranslator};
pub use host::{
    CompositionEventKind, DispatchOutcome, Host, HostDocument, HostPosition, HostRange, InputType,
};
