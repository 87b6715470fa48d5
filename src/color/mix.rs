//! Channel mixing and brightness
//!
//! A [`ColorSetup`] attenuates every incoming color before it is stored.

use serde::{Deserialize, Serialize};

use super::{clamp_channel, Color};

/// Name of a color channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelName {
    Red,
    Green,
    Blue,
}

/// Scale factor for one channel, `value` in `[0, 255]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorChannel {
    pub name: ChannelName,
    pub value: f64,
}

impl ColorChannel {
    pub fn new(name: ChannelName, value: f64) -> Self {
        Self { name, value }
    }

    /// Scale factor in `[0, 1]`
    fn factor(&self) -> f64 {
        if self.value.is_nan() {
            return 0.0;
        }
        self.value.clamp(0.0, 255.0) / 255.0
    }
}

/// Per-channel attenuation applied to every incoming color.
///
/// Channel `i` of the setup scales byte `i` of the color (red, green, blue
/// in that order). Missing channels scale to zero. A setup is swapped as a
/// whole, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSetup {
    pub channels: Vec<ColorChannel>,
}

impl ColorSetup {
    /// Build a setup from red, green and blue scale values
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            channels: vec![
                ColorChannel::new(ChannelName::Red, red),
                ColorChannel::new(ChannelName::Green, green),
                ColorChannel::new(ChannelName::Blue, blue),
            ],
        }
    }

    /// Pass-through setup (every channel at 255)
    pub fn pass_through() -> Self {
        Self::rgb(255.0, 255.0, 255.0)
    }

    /// Fully attenuated setup (every channel at 0)
    pub fn muted() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    fn factor(&self, index: usize) -> f64 {
        self.channels.get(index).map(ColorChannel::factor).unwrap_or(0.0)
    }
}

impl Default for ColorSetup {
    fn default() -> Self {
        Self::pass_through()
    }
}

/// Attenuate `input` by the channel scale factors of `setup`
pub fn mix(setup: &ColorSetup, input: Color) -> Color {
    let channels = input.channels();
    let mut out = [0u8; 3];
    for (i, byte) in channels.iter().enumerate() {
        out[i] = clamp_channel(*byte as f64 * setup.factor(i));
    }
    Color::from_channels(out)
}

/// Mean of the three channel bytes
pub fn brightness(color: Color) -> f64 {
    let [r, g, b] = color.channels();
    (r as f64 + g as f64 + b as f64) / 3.0
}

/// Scale every channel by `target / 255`.
///
/// Channel ratios are preserved but each channel is rounded on its own,
/// so `brightness(set_brightness(c, t))` is only approximately `t`-scaled.
pub fn set_brightness(color: Color, target: f64) -> Color {
    let scale = if target.is_nan() { 0.0 } else { target / 255.0 };
    let channels = color.channels();
    let mut out = [0u8; 3];
    for (i, byte) in channels.iter().enumerate() {
        out[i] = clamp_channel(*byte as f64 * scale);
    }
    Color::from_channels(out)
}
