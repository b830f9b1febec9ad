//! Composition decorations
//!
//! Input methods underline (parts of) the composing text, typically with a
//! thick line under the segment being converted. Markers are expressed
//! relative to the composition start and are rebuilt on every call.

use std::fmt;

use preedit_engine::PlainTextRange;
use serde::{Deserialize, Serialize};

/// Error returned when a color string is not `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(String);

/// An RGBA color, serialized as a `#rrggbbaa` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x0000_00ff);
    pub const TRANSPARENT: Color = Color(0);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(u32::from_be_bytes([r, g, b, a]))
    }

    pub fn rgba(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn is_transparent(self) -> bool {
        self.rgba()[3] == 0
    }

    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let value = u32::from_str_radix(hex, 16).map_err(|_| err())?;
        match hex.len() {
            6 => Ok(Color((value << 8) | 0xff)),
            8 => Ok(Color(value)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A visual annotation over a sub-range of the composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationMarker {
    /// Range relative to the composition start
    pub range: PlainTextRange,
    /// Underline color
    pub color: Color,
    /// Thick underline (typically the segment being converted)
    pub thick: bool,
    /// Background color
    pub background_color: Color,
}

impl DecorationMarker {
    /// A thin black underline over `range`.
    pub fn new(range: PlainTextRange) -> Self {
        Self {
            range,
            color: Color::BLACK,
            thick: false,
            background_color: Color::TRANSPARENT,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_thick(mut self, thick: bool) -> Self {
        self.thick = thick;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Absolute range of this marker for a composition at `[start, end)`.
    ///
    /// Returns `None` when the marker lies entirely outside the composition.
    pub fn resolve(&self, composition: PlainTextRange) -> Option<PlainTextRange> {
        let absolute = self.range.offset_by(composition.start());
        if absolute.start() > composition.end() {
            return None;
        }
        let end = absolute.end().min(composition.end());
        if absolute.start() == end && !self.range.is_collapsed() {
            return None;
        }
        PlainTextRange::new(absolute.start(), end).ok()
    }
}

/// Appearance of the marker applied when an input method sends none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationStyle {
    pub color: Color,
    pub background_color: Color,
    pub thick: bool,
}

impl Default for DecorationStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            thick: false,
        }
    }
}

impl DecorationStyle {
    /// A marker in this style covering a composition of `len` code units.
    pub fn marker_over(&self, len: usize) -> DecorationMarker {
        DecorationMarker::new(PlainTextRange::from_unordered(0, len))
            .with_color(self.color)
            .with_background(self.background_color)
            .with_thick(self.thick)
    }
}
