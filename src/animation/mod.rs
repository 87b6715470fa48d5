//! Animations
//!
//! Timer-driven effects for a strip. An [`Animator`] owns its running
//! animations as named tokio tasks: starting a name that is already
//! running is ignored, stopping a name that is not running is a no-op.
//! Dropping the animator stops everything it started.
//!
//! Animations never touch strip state directly; they submit updates
//! through a [`StripHandle`] like any other producer.

mod pattern;
mod transition;

pub use pattern::Pattern;
pub use transition::{BrightnessTransition, ColorTransition, Easing};

use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::strip::{ColorUpdate, StripHandle};

/// Named set of running animations
#[derive(Default)]
pub struct Animator {
    running: HashMap<String, JoinHandle<()>>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `tick` every `period` under `name`.
    ///
    /// Returns false, leaving the running animation alone, if `name` is
    /// already running.
    pub fn start<F>(&mut self, name: &str, period: Duration, mut tick: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        self.reap();
        if self.running.contains_key(name) {
            tracing::debug!(animation = %name, "Animation already running");
            return false;
        }

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick();
            }
        });

        self.running.insert(name.to_string(), task);
        tracing::info!(
            animation = %name,
            period_ms = period.as_millis() as u64,
            "Animation started"
        );
        true
    }

    /// Play `pattern` on the strip, one frame per `period`
    pub fn start_pattern(
        &mut self,
        name: &str,
        pattern: Pattern,
        num_leds: usize,
        period: Duration,
        strip: StripHandle,
    ) -> bool {
        let mut step = 0usize;
        self.start(name, period, move || {
            for (i, color) in pattern.frame(step, num_leds).into_iter().enumerate() {
                strip.submit(ColorUpdate::new(i as i64, color));
            }
            step = step.wrapping_add(1);
        })
    }

    /// Fade one LED along `transition`, stopping itself when done
    pub fn start_transition(
        &mut self,
        name: &str,
        index: i64,
        transition: ColorTransition,
        period: Duration,
        strip: StripHandle,
    ) -> bool {
        self.reap();
        if self.running.contains_key(name) {
            return false;
        }

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let elapsed = started.elapsed();
                strip.submit(ColorUpdate::new(index, transition.color_at(elapsed)));
                if elapsed >= transition.duration {
                    break;
                }
            }
        });

        self.running.insert(name.to_string(), task);
        true
    }

    /// Stop the animation running under `name`.
    ///
    /// Returns false if nothing was running under that name.
    pub fn stop(&mut self, name: &str) -> bool {
        match self.running.remove(name) {
            Some(task) => {
                task.abort();
                tracing::info!(animation = %name, "Animation stopped");
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        for (_, task) in self.running.drain() {
            task.abort();
        }
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running
            .get(name)
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Forget animations that finished on their own
    fn reap(&mut self) {
        self.running.retain(|_, task| !task.is_finished());
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.stop_all();
    }
}
