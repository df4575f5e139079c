//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for the
//! manual queue entry points, round control, and streaming events from
//! specific topics.
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use game_core::{ActionQueueEntry, Character, CharacterId, Conversation, World};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, ExecutorPhase, Notice, Topic};
use crate::scheduler::{ExecutionReport, RoundSummary};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    phase: watch::Receiver<ExecutorPhase>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        phase: watch::Receiver<ExecutorPhase>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            phase,
        }
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Appends one entry to a character's queue.
    ///
    /// A full queue is rejected without modification and reported on the
    /// notice topic as well as in the returned error.
    pub async fn add_action(&self, character: CharacterId, entry: ActionQueueEntry) -> Result<()> {
        self.request(|reply| Command::Enqueue {
            character,
            entry,
            reply,
        })
        .await?
    }

    /// Empties one queue and stops that character's in-flight entry.
    pub async fn clear_queue(&self, character: CharacterId) -> Result<()> {
        self.request(|reply| Command::ClearQueue { character, reply })
            .await?
    }

    pub async fn clear_all_queues(&self) -> Result<()> {
        self.request(|reply| Command::ClearAll { reply }).await
    }

    /// Requests a full round from the action provider for every character.
    pub async fn generate_round(&self) -> Result<RoundSummary> {
        self.request(|reply| Command::GenerateRound { reply })
            .await?
    }

    /// Runs every queued entry in lockstep and waits until the round drains.
    pub async fn execute_round(&self) -> Result<ExecutionReport> {
        self.request(|reply| Command::ExecuteRound { reply })
            .await?
    }

    /// Turns the auto-run loop on or off. Returns the new state.
    ///
    /// Turning it off lets a round in progress finish.
    pub async fn set_auto_run(&self, enabled: bool) -> Result<bool> {
        self.request(|reply| Command::SetAutoRun {
            enabled: Some(enabled),
            reply,
        })
        .await
    }

    pub async fn toggle_auto_run(&self) -> Result<bool> {
        self.request(|reply| Command::SetAutoRun {
            enabled: None,
            reply,
        })
        .await
    }

    /// Removes a character and its queue; `None` if it was not present.
    pub async fn remove_character(&self, character: CharacterId) -> Result<Option<Character>> {
        self.request(|reply| Command::RemoveCharacter { character, reply })
            .await
    }

    /// Read-only snapshot of the world.
    pub async fn query_world(&self) -> Result<World> {
        self.request(|reply| Command::QueryWorld { reply }).await
    }

    /// Latest notices, oldest first.
    pub async fn activity_log(&self) -> Result<Vec<Notice>> {
        self.request(|reply| Command::QueryActivity { reply })
            .await
    }

    pub async fn latest_conversation(&self) -> Result<Option<Conversation>> {
        let world = self.query_world().await?;
        Ok(world.conversations().latest().cloned())
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Notice` - human-readable system notices
    /// - `Topic::Queue` - queue snapshots after every mutation
    /// - `Topic::Execution` - phase changes and per-entry progress
    /// - `Topic::Conversation` - conversation lifecycle and dialogue lines
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut notices = handle.subscribe(Topic::Notice);
    /// while let Ok(event) = notices.recv().await {
    ///     // Render the notice
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Current executor phase.
    pub fn phase(&self) -> ExecutorPhase {
        *self.phase.borrow()
    }

    /// Watch receiver that resolves on every phase transition.
    pub fn watch_phase(&self) -> watch::Receiver<ExecutorPhase> {
        self.phase.clone()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
