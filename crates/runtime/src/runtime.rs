//! High-level runtime orchestrator.
//!
//! The runtime owns the background workers, wires up the command channel and
//! the event bus, and exposes a builder-based API for clients to drive the
//! scheduler.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use game_core::{Character, MovementConfig, SpatialMap, World};

use crate::api::{
    ActionProvider, DialogueProvider, ProviderKind, Result, RuntimeError, RuntimeHandle,
};
use crate::events::{Event, EventBus, Topic};
use crate::scheduler::{ExecutionReport, RoundSummary, Scheduler, SchedulerParts};
use crate::workers::{AutoRunWorker, CommandWorker};

/// Timing knobs for the generator, executor and auto-run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Executor poll rate in frames per second.
    pub frame_rate: u32,
    pub animation_ms: u64,
    pub talk_min_ms: u64,
    pub talk_max_ms: u64,
    pub wander_ms: u64,
    pub goto_timeout_ms: u64,
    /// How long front-ends should keep the completion notice on screen.
    pub completion_notice_ms: u64,
    pub auto_run_idle_ms: u64,
    /// Lines exchanged per conversation, initiator first.
    pub dialogue_turns: u32,
    pub dialogue_pause_ms: u64,
}

impl SchedulerConfig {
    pub const DEFAULT_FRAME_RATE: u32 = 60;
    pub const DEFAULT_ANIMATION_MS: u64 = 3_000;
    pub const DEFAULT_TALK_MIN_MS: u64 = 5_000;
    pub const DEFAULT_TALK_MAX_MS: u64 = 10_000;
    pub const DEFAULT_WANDER_MS: u64 = 5_000;
    pub const DEFAULT_GOTO_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_COMPLETION_NOTICE_MS: u64 = 3_000;
    pub const DEFAULT_AUTO_RUN_IDLE_MS: u64 = 1_000;
    pub const DEFAULT_DIALOGUE_TURNS: u32 = 4;
    pub const DEFAULT_DIALOGUE_PAUSE_MS: u64 = 1_000;

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }

    /// Simulated seconds advanced per frame.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    /// Inclusive talk duration bounds, ordered even if configured backwards.
    pub fn talk_bounds_ms(&self) -> (u64, u64) {
        if self.talk_min_ms <= self.talk_max_ms {
            (self.talk_min_ms, self.talk_max_ms)
        } else {
            (self.talk_max_ms, self.talk_min_ms)
        }
    }

    pub fn wander(&self) -> Duration {
        Duration::from_millis(self.wander_ms)
    }

    pub fn goto_timeout(&self) -> Duration {
        Duration::from_millis(self.goto_timeout_ms)
    }

    pub fn auto_run_idle(&self) -> Duration {
        Duration::from_millis(self.auto_run_idle_ms)
    }

    pub fn dialogue_pause(&self) -> Duration {
        Duration::from_millis(self.dialogue_pause_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_rate: Self::DEFAULT_FRAME_RATE,
            animation_ms: Self::DEFAULT_ANIMATION_MS,
            talk_min_ms: Self::DEFAULT_TALK_MIN_MS,
            talk_max_ms: Self::DEFAULT_TALK_MAX_MS,
            wander_ms: Self::DEFAULT_WANDER_MS,
            goto_timeout_ms: Self::DEFAULT_GOTO_TIMEOUT_MS,
            completion_notice_ms: Self::DEFAULT_COMPLETION_NOTICE_MS,
            auto_run_idle_ms: Self::DEFAULT_AUTO_RUN_IDLE_MS,
            dialogue_turns: Self::DEFAULT_DIALOGUE_TURNS,
            dialogue_pause_ms: Self::DEFAULT_DIALOGUE_PAUSE_MS,
        }
    }
}

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub movement: MovementConfig,
    pub scheduler: SchedulerConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub activity_log_capacity: usize,
    /// Fixed rng seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Start with the auto-run loop enabled.
    pub auto_run: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            scheduler: SchedulerConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            activity_log_capacity: 64,
            seed: None,
            auto_run: false,
        }
    }
}

/// Main runtime that owns the scheduler workers.
///
/// [`RuntimeHandle`] is the cloneable façade clients use; the runtime itself
/// only adds lifecycle control.
pub struct Runtime {
    handle: RuntimeHandle,
    shutdown: CancellationToken,
    command_worker: JoinHandle<()>,
    auto_run_worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    pub async fn generate_round(&self) -> Result<RoundSummary> {
        self.handle.generate_round().await
    }

    pub async fn execute_round(&self) -> Result<ExecutionReport> {
        self.handle.execute_round().await
    }

    /// Generates a round and immediately executes it.
    pub async fn run_round(&self) -> Result<ExecutionReport> {
        self.generate_round().await?;
        self.execute_round().await
    }

    /// Stops both workers. A round in progress is abandoned at its next poll.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown.cancel();
        drop(self.handle);

        self.auto_run_worker
            .await
            .map_err(RuntimeError::WorkerJoin)?;
        self.command_worker
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!(target: "runtime::worker", "runtime stopped");
        Ok(())
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    map: Option<Arc<SpatialMap>>,
    characters: Vec<Character>,
    action_provider: Option<Arc<dyn ActionProvider>>,
    dialogue_provider: Option<Arc<dyn DialogueProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            map: None,
            characters: Vec::new(),
            action_provider: None,
            dialogue_provider: None,
        }
    }

    /// Override runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn map(self, map: SpatialMap) -> Self {
        self.shared_map(Arc::new(map))
    }

    pub fn shared_map(mut self, map: Arc<SpatialMap>) -> Self {
        self.map = Some(map);
        self
    }

    pub fn character(mut self, character: Character) -> Self {
        self.characters.push(character);
        self
    }

    pub fn characters(mut self, characters: impl IntoIterator<Item = Character>) -> Self {
        self.characters.extend(characters);
        self
    }

    /// Set the action provider (required).
    pub fn action_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.action_provider = Some(Arc::new(provider));
        self
    }

    /// Set the dialogue provider. Without one, conversations stay silent.
    pub fn dialogue_provider(mut self, provider: impl DialogueProvider + 'static) -> Self {
        self.dialogue_provider = Some(Arc::new(provider));
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn auto_run(mut self, enabled: bool) -> Self {
        self.config.auto_run = enabled;
        self
    }

    /// Build the runtime and spawn its workers.
    pub async fn build(self) -> Result<Runtime> {
        let map = self.map.ok_or(RuntimeError::MissingMap)?;
        let action_provider = self.action_provider.ok_or(RuntimeError::ProviderNotSet {
            kind: ProviderKind::Action,
        })?;

        let mut world = World::new(map, self.config.movement);
        for character in self.characters {
            world.spawn(character)?;
        }

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let scheduler = Arc::new(Scheduler::new(SchedulerParts {
            world,
            rng,
            bus: bus.clone(),
            config: self.config.scheduler,
            activity_log_capacity: self.config.activity_log_capacity,
            action_provider,
            dialogue_provider: self.dialogue_provider,
        }));

        let shutdown = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (auto_run_tx, auto_run_rx) = watch::channel(self.config.auto_run);

        let handle = RuntimeHandle::new(command_tx, bus, scheduler.subscribe_phase());

        let auto_run = AutoRunWorker::new(Arc::clone(&scheduler), auto_run_rx, shutdown.clone());
        let auto_run_worker = tokio::spawn(auto_run.run());

        let commands = CommandWorker::new(scheduler, command_rx, auto_run_tx, shutdown.clone());
        let command_worker = tokio::spawn(commands.run());

        info!(
            target: "runtime::worker",
            auto_run = self.config.auto_run,
            seed = ?self.config.seed,
            "runtime started"
        );

        Ok(Runtime {
            handle,
            shutdown,
            command_worker,
            auto_run_worker,
        })
    }
}
