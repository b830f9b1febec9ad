//! Type definitions for the composition controller

use serde::Serialize;

use crate::config::settings::Settings;
use crate::core::decoration::DecorationStyle;

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Marker applied over the whole composition when `set_composition` is
    /// given no decorations (`None` disables it)
    pub default_decoration: Option<DecorationStyle>,
    /// `keep_selection` used when focus loss commits the composition
    pub keep_selection_on_focus_change: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_decoration: Some(DecorationStyle::default()),
            keep_selection_on_focus_change: true,
        }
    }
}

impl From<&Settings> for ControllerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            default_decoration: settings.decoration.style(),
            keep_selection_on_focus_change: settings.editing.keep_selection_on_focus_change,
        }
    }
}

/// What an input method sees of the editable scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TextInputSnapshot {
    /// Text of the editable scope
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
    /// Composition bounds, `None` while idle
    pub composition_start: Option<usize>,
    pub composition_end: Option<usize>,
}

/// Arguments of a `set_composition` call
#[derive(Debug, Clone, Copy)]
pub(super) struct CompositionRequest<'a> {
    pub text: &'a str,
    pub decorations: &'a [crate::core::decoration::DecorationMarker],
    /// Selection offsets relative to the start of the replaced range
    pub selection_start: i32,
    pub selection_end: i32,
}
