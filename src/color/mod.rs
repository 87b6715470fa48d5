//! Color Model
//!
//! Pure color arithmetic for the strip: hex parsing and formatting,
//! per-channel mixing, brightness and interpolation. Nothing in here
//! holds state.
//!
//! ## Rounding
//!
//! Every channel computation is done in `f64`, rounded half away from zero
//! and clamped to `[0, 255]`. Malformed hex input never fails the lenient
//! entry points: it degrades to `#000000`.

mod mix;
mod rgb;

pub use mix::{brightness, mix, set_brightness, ChannelName, ColorChannel, ColorSetup};
pub use rgb::{from_hsl, lerp, Color, ColorParseError};

/// Round and clamp a channel computation back into a byte
pub(crate) fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(-4.0), 0);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(127.5), 128);
        assert_eq!(clamp_channel(f64::NAN), 0);
    }
}
