//! Timed color and brightness transitions

use std::time::Duration;

use crate::color::{brightness, lerp, set_brightness, Color};

/// Easing curve applied to transition progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Fraction of `duration` covered by `elapsed`, in `[0, 1]`
fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Fade between two colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransition {
    pub from: Color,
    pub to: Color,
    pub duration: Duration,
    pub easing: Easing,
}

impl ColorTransition {
    pub fn new(from: Color, to: Color, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
        }
    }

    pub fn color_at(&self, elapsed: Duration) -> Color {
        let t = self.easing.apply(progress(elapsed, self.duration));
        lerp(self.from, self.to, t)
    }
}

/// Ramp a color's brightness towards a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessTransition {
    pub color: Color,
    pub target: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl BrightnessTransition {
    pub fn new(color: Color, target: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            color,
            target,
            duration,
            easing,
        }
    }

    /// Color at `elapsed`; brightness moves from the start color's
    /// brightness to `target`, scaling the start color
    pub fn color_at(&self, elapsed: Duration) -> Color {
        let start = brightness(self.color);
        let t = self.easing.apply(progress(elapsed, self.duration));
        set_brightness(self.color, start + (self.target - start) * t)
    }
}
