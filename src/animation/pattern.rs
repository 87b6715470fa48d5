//! Preconfigured strip patterns

use crate::color::{from_hsl, Color};

/// A frame generator for the whole strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// One lit LED walking along the strip
    Chase { on: Color, off: Color },
    /// Hue wheel spread over the strip, rotating 10 degrees per step
    Rainbow,
}

impl Pattern {
    /// Colors of every LED at `step`
    pub fn frame(&self, step: usize, num_leds: usize) -> Vec<Color> {
        if num_leds == 0 {
            return Vec::new();
        }

        match self {
            Pattern::Chase { on, off } => {
                let lit = step % num_leds;
                (0..num_leds)
                    .map(|i| if i == lit { *on } else { *off })
                    .collect()
            }
            Pattern::Rainbow => {
                let offset = (step % 36) as f64 * 10.0;
                (0..num_leds)
                    .map(|i| {
                        let hue = offset + i as f64 * 360.0 / num_leds as f64;
                        from_hsl(hue, 1.0, 0.5)
                    })
                    .collect()
            }
        }
    }
}
