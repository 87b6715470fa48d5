//! Strip State
//!
//! The canonical state of one LED strip: its dimensions, bends, active
//! color setup and the current color of every element.
//!
//! ## Ownership
//!
//! A [`StripState`] has exactly one owner, the [`StripEngine`] task. Every
//! other component talks to it through a cloneable [`StripHandle`], which
//! enqueues commands that the engine applies one at a time, in order.

mod engine;

pub use engine::{EngineCommand, StripEngine, StripHandle};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::color::{mix, Color, ColorSetup};
use crate::geometry::{layout, Bend, Point};

/// Physical dimensions of a strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripConfig {
    /// Path length of the strip
    pub length: f64,
    /// Number of physical elements
    pub num_leds: usize,
    /// Number of individually settable elements
    pub addressable_leds: usize,
}

impl StripConfig {
    pub fn new(length: f64, num_leds: usize, addressable_leds: usize) -> Self {
        Self {
            length,
            num_leds,
            addressable_leds,
        }
    }
}

/// A single color assignment, the unit every adapter produces and every
/// broadcast carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorUpdate {
    pub index: i64,
    pub color: Color,
}

impl ColorUpdate {
    pub fn new(index: i64, color: Color) -> Self {
        Self { index, color }
    }
}

/// Errors raised when building a strip
#[derive(Debug, Error, PartialEq)]
pub enum StripError {
    #[error("Strip must have at least one LED")]
    NoLeds,

    #[error("Invalid strip length: {0}")]
    InvalidLength(f64),
}

/// Canonical state of one strip
#[derive(Debug, Clone)]
pub struct StripState {
    config: StripConfig,
    bends: Vec<Bend>,
    color_setup: Arc<ColorSetup>,
    colors: Vec<Color>,
}

impl StripState {
    /// Create a strip with every element black and a pass-through setup
    pub fn new(config: StripConfig) -> Result<Self, StripError> {
        if config.num_leds == 0 {
            return Err(StripError::NoLeds);
        }
        if !config.length.is_finite() || config.length < 0.0 {
            return Err(StripError::InvalidLength(config.length));
        }

        let mut config = config;
        if config.addressable_leds > config.num_leds {
            tracing::warn!(
                addressable_leds = config.addressable_leds,
                num_leds = config.num_leds,
                "More addressable LEDs than physical LEDs, clamping"
            );
            config.addressable_leds = config.num_leds;
        }

        Ok(Self {
            colors: vec![Color::BLACK; config.num_leds],
            config,
            bends: Vec::new(),
            color_setup: Arc::new(ColorSetup::default()),
        })
    }

    /// Builder-style color setup
    pub fn with_color_setup(mut self, setup: ColorSetup) -> Self {
        self.set_color_setup(setup);
        self
    }

    /// Builder-style bend list
    pub fn with_bends(mut self, bends: Vec<Bend>) -> Self {
        self.set_bends(bends);
        self
    }

    pub fn config(&self) -> &StripConfig {
        &self.config
    }

    pub fn num_leds(&self) -> usize {
        self.config.num_leds
    }

    pub fn bends(&self) -> &[Bend] {
        &self.bends
    }

    pub fn color_setup(&self) -> &ColorSetup {
        &self.color_setup
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Mix `raw` through the active setup and store it at `index`.
    ///
    /// Returns the effective (post-mix) update, or `None` when `index` is
    /// outside `[0, num_leds)`; such updates leave the strip untouched.
    pub fn apply_update(&mut self, index: i64, raw: Color) -> Option<ColorUpdate> {
        let slot = usize::try_from(index)
            .ok()
            .filter(|i| *i < self.colors.len())?;

        let effective = mix(&self.color_setup, raw);
        self.colors[slot] = effective;
        Some(ColorUpdate::new(index, effective))
    }

    /// Mix `raw` and write it to every element
    pub fn fill(&mut self, raw: Color) -> Vec<ColorUpdate> {
        let effective = mix(&self.color_setup, raw);
        self.colors.fill(effective);
        (0..self.colors.len())
            .map(|i| ColorUpdate::new(i as i64, effective))
            .collect()
    }

    pub fn add_bend(&mut self, bend: Bend) {
        self.bends.push(bend);
    }

    /// Replace the whole bend list
    pub fn set_bends(&mut self, bends: Vec<Bend>) {
        self.bends = bends;
    }

    /// Swap in a new color setup. Stored colors are not re-mixed.
    pub fn set_color_setup(&mut self, setup: ColorSetup) {
        self.color_setup = Arc::new(setup);
    }

    /// Positions of every element for the current bends
    pub fn layout(&self) -> Vec<Point> {
        layout(self.config.length, self.config.num_leds, &self.bends)
    }

    /// Immutable copy of the current state
    pub fn snapshot(&self) -> StripSnapshot {
        StripSnapshot {
            config: self.config,
            bends: self.bends.clone(),
            color_setup: Arc::clone(&self.color_setup),
            colors: self.colors.clone(),
        }
    }
}

/// Point-in-time copy of a strip, safe to hand out to readers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripSnapshot {
    #[serde(flatten)]
    pub config: StripConfig,
    pub bends: Vec<Bend>,
    pub color_setup: Arc<ColorSetup>,
    pub colors: Vec<Color>,
}

impl StripSnapshot {
    pub fn layout(&self) -> Vec<Point> {
        layout(self.config.length, self.config.num_leds, &self.bends)
    }
}
