//! Strip Engine
//!
//! The single task that owns a [`StripState`]. Commands arrive over an
//! unbounded FIFO queue and are applied one at a time; an update's
//! fan-out finishes before the next command is read, so subscribers see
//! updates in exactly the order they were submitted.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{ColorUpdate, StripSnapshot, StripState};
use crate::broadcast::{BroadcastMessage, SubscriberHub};
use crate::color::{Color, ColorSetup};
use crate::geometry::Bend;

/// Commands accepted by the engine
#[derive(Debug)]
pub enum EngineCommand {
    /// Apply a raw color to one LED and broadcast the effective color
    Update(ColorUpdate),
    /// Apply a raw color to every LED
    Fill(Color),
    /// Append a bend
    AddBend(Bend),
    /// Replace the bend list
    SetBends(Vec<Bend>),
    /// Swap the color setup
    SetColorSetup(ColorSetup),
    /// Read a copy of the current state
    Snapshot(oneshot::Sender<StripSnapshot>),
}

/// Owner of the strip state
pub struct StripEngine {
    state: StripState,
    hub: Arc<SubscriberHub>,
    commands: mpsc::UnboundedReceiver<EngineCommand>,
}

/// Cloneable handle for submitting commands to a [`StripEngine`]
#[derive(Debug, Clone)]
pub struct StripHandle {
    sender: mpsc::UnboundedSender<EngineCommand>,
}

impl StripEngine {
    /// Create an engine and the handle that feeds it
    pub fn new(state: StripState, hub: Arc<SubscriberHub>) -> (Self, StripHandle) {
        let (sender, commands) = mpsc::unbounded_channel();
        let engine = Self {
            state,
            hub,
            commands,
        };
        (engine, StripHandle { sender })
    }

    /// Run the engine on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Apply commands until every handle has been dropped
    pub async fn run(mut self) {
        tracing::info!(
            num_leds = self.state.num_leds(),
            bends = self.state.bends().len(),
            "Strip engine started"
        );

        while let Some(command) = self.commands.recv().await {
            self.handle(command).await;
        }

        tracing::info!("Strip engine stopped");
    }

    async fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Update(update) => {
                match self.state.apply_update(update.index, update.color) {
                    Some(effective) => {
                        tracing::debug!(
                            index = effective.index,
                            raw = %update.color,
                            color = %effective.color,
                            "Applied update"
                        );
                        self.hub.broadcast(&BroadcastMessage::from(effective)).await;
                    }
                    None => {
                        tracing::debug!(
                            index = update.index,
                            num_leds = self.state.num_leds(),
                            "Ignored update outside the strip"
                        );
                    }
                }
            }
            EngineCommand::Fill(color) => {
                for effective in self.state.fill(color) {
                    self.hub.broadcast(&BroadcastMessage::from(effective)).await;
                }
            }
            EngineCommand::AddBend(bend) => {
                self.state.add_bend(bend);
                tracing::info!(length = bend.length, angle = bend.angle, "Added bend");
            }
            EngineCommand::SetBends(bends) => {
                tracing::info!(bends = bends.len(), "Replaced bend list");
                self.state.set_bends(bends);
            }
            EngineCommand::SetColorSetup(setup) => {
                tracing::info!(setup = ?setup, "Replaced color setup");
                self.state.set_color_setup(setup);
            }
            EngineCommand::Snapshot(reply) => {
                // The reader may have gone away; nothing to do then
                let _ = reply.send(self.state.snapshot());
            }
        }
    }
}

impl StripHandle {
    /// Queue a raw update. Returns false if the engine has stopped.
    pub fn submit(&self, update: ColorUpdate) -> bool {
        self.send(EngineCommand::Update(update))
    }

    pub fn fill(&self, color: Color) -> bool {
        self.send(EngineCommand::Fill(color))
    }

    pub fn add_bend(&self, bend: Bend) -> bool {
        self.send(EngineCommand::AddBend(bend))
    }

    pub fn set_bends(&self, bends: Vec<Bend>) -> bool {
        self.send(EngineCommand::SetBends(bends))
    }

    pub fn set_color_setup(&self, setup: ColorSetup) -> bool {
        self.send(EngineCommand::SetColorSetup(setup))
    }

    /// Read the current state. `None` if the engine has stopped.
    pub async fn snapshot(&self) -> Option<StripSnapshot> {
        let (reply, response) = oneshot::channel();
        if !self.send(EngineCommand::Snapshot(reply)) {
            return None;
        }
        response.await.ok()
    }

    fn send(&self, command: EngineCommand) -> bool {
        if self.sender.send(command).is_err() {
            tracing::warn!("Strip engine is not running, command dropped");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::StripConfig;

    fn start(num_leds: usize, setup: ColorSetup) -> (StripHandle, Arc<SubscriberHub>) {
        let state = StripState::new(StripConfig::new(10.0, num_leds, num_leds))
            .unwrap()
            .with_color_setup(setup);
        let hub = Arc::new(SubscriberHub::default());
        let (engine, handle) = StripEngine::new(state, Arc::clone(&hub));
        engine.spawn();
        (handle, hub)
    }

    #[tokio::test]
    async fn test_update_is_applied_and_broadcast() {
        let (handle, hub) = start(10, ColorSetup::rgb(255.0, 0.0, 255.0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        assert!(handle.submit(ColorUpdate::new(2, Color::WHITE)));

        let msg = rx.recv().await.unwrap();
        assert_eq!(
            msg,
            BroadcastMessage::Update {
                index: 2,
                color: Color::new(255, 0, 255)
            }
        );

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.colors[2], Color::new(255, 0, 255));
    }

    #[tokio::test]
    async fn test_out_of_range_update_is_not_broadcast() {
        let (handle, hub) = start(4, ColorSetup::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        handle.submit(ColorUpdate::new(4, Color::WHITE));
        handle.submit(ColorUpdate::new(-1, Color::WHITE));

        // Snapshot is answered after the updates, so they have been handled
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.colors.iter().all(|c| *c == Color::BLACK));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_updates_keep_submission_order() {
        let (handle, hub) = start(50, ColorSetup::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        for i in 0..50 {
            handle.submit(ColorUpdate::new(i, Color::new(i as u8, 0, 0)));
        }
        for i in 0..50 {
            match rx.recv().await.unwrap() {
                BroadcastMessage::Update { index, .. } => assert_eq!(index, i),
            }
        }
    }

    #[tokio::test]
    async fn test_configuration_commands() {
        let (handle, _hub) = start(4, ColorSetup::default());

        handle.add_bend(Bend::new(1.0, 90.0));
        handle.add_bend(Bend::new(1.0, 90.0));
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.bends.len(), 2);

        handle.set_bends(vec![Bend::new(2.0, 45.0)]);
        handle.set_color_setup(ColorSetup::muted());
        handle.fill(Color::WHITE);

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.bends, vec![Bend::new(2.0, 45.0)]);
        assert_eq!(*snapshot.color_setup, ColorSetup::muted());
        assert!(snapshot.colors.iter().all(|c| *c == Color::BLACK));
    }
}
