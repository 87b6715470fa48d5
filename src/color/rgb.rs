//! RGB color value
//!
//! A 24-bit color that serializes as a lowercase `#rrggbb` string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::clamp_channel;

/// A 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned by the strict parser
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Expected 6 hex digits, got {0} characters")]
    Length(usize),

    #[error("Invalid hex digit in color: {0}")]
    InvalidDigit(String),
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color, treating anything malformed as black.
    ///
    /// Accepts `#rrggbb` or `rrggbb` in either case.
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or(Color::BLACK)
    }

    /// Channels as `[r, g, b]`
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_channels(channels: [u8; 3]) -> Self {
        Self::new(channels[0], channels[1], channels[2])
    }

    /// Format as lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());

        if digits.len() != 6 {
            return Err(ColorParseError::Length(digits.len()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(s.to_string()));
        }

        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit(s.to_string()))
        };

        Ok(Color::new(byte(0)?, byte(2)?, byte(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// Deserialization is lenient on purpose: wire colors that fail to parse
// are stored as black rather than rejecting the whole message.
impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Color::parse_lenient(&raw))
    }
}

/// Linear interpolation between two colors, `t` clamped to `[0, 1]`
pub fn lerp(from: Color, to: Color, t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let a = from.channels();
    let b = to.channels();

    let mut out = [0u8; 3];
    for i in 0..3 {
        let start = a[i] as f64;
        let end = b[i] as f64;
        out[i] = clamp_channel(start + (end - start) * t);
    }
    Color::from_channels(out)
}

/// Convert HSL to RGB.
///
/// `hue` is in degrees (wrapped into `[0, 360)`), `saturation` and
/// `lightness` are fractions in `[0, 1]`.
pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Color {
    let h = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = l - chroma / 2.0;
    Color::new(
        clamp_channel((r + m) * 255.0),
        clamp_channel((g + m) * 255.0),
        clamp_channel((b + m) * 255.0),
    )
}
