//! Shared coordinator behind the command and auto-run workers.
//!
//! [`Scheduler`] owns the [`World`] behind an async mutex together with the
//! providers, the event bus and the in-flight flag that serializes the
//! generator and the executor. Workers hold it through an `Arc`; per-entry
//! executor tasks clone that `Arc` so each task can lock the world for one
//! frame at a time.
mod entries;
mod executor;
mod generator;
mod guard;

pub use executor::ExecutionReport;
pub use generator::RoundSummary;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

use game_core::{ActionQueueEntry, Character, CharacterId, World};

use crate::api::{ActionProvider, DialogueProvider, Result};
use crate::events::{
    ActivityLog, Event, EventBus, ExecutionEvent, ExecutorPhase, Notice, NoticeLevel, QueueEvent,
};
use crate::runtime::SchedulerConfig;

pub(crate) struct Scheduler {
    world: Mutex<World>,
    /// Always locked after `world` when both are needed.
    rng: Mutex<StdRng>,
    activity: Mutex<ActivityLog>,
    bus: EventBus,
    config: SchedulerConfig,
    action_provider: Arc<dyn ActionProvider>,
    dialogue_provider: Option<Arc<dyn DialogueProvider>>,
    in_flight: AtomicBool,
    phase: watch::Sender<ExecutorPhase>,
}

pub(crate) struct SchedulerParts {
    pub world: World,
    pub rng: StdRng,
    pub bus: EventBus,
    pub config: SchedulerConfig,
    pub activity_log_capacity: usize,
    pub action_provider: Arc<dyn ActionProvider>,
    pub dialogue_provider: Option<Arc<dyn DialogueProvider>>,
}

impl Scheduler {
    pub fn new(parts: SchedulerParts) -> Self {
        Self {
            world: Mutex::new(parts.world),
            rng: Mutex::new(parts.rng),
            activity: Mutex::new(ActivityLog::new(parts.activity_log_capacity)),
            bus: parts.bus,
            config: parts.config,
            action_provider: parts.action_provider,
            dialogue_provider: parts.dialogue_provider,
            in_flight: AtomicBool::new(false),
            phase: watch::channel(ExecutorPhase::Idle).0,
        }
    }

    pub fn world(&self) -> &Mutex<World> {
        &self.world
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ExecutorPhase> {
        self.phase.subscribe()
    }

    fn set_phase(&self, phase: ExecutorPhase) {
        self.phase.send_replace(phase);
        self.bus
            .publish(Event::Execution(ExecutionEvent::PhaseChanged(phase)));
    }

    /// Records a notice in the activity log and publishes it.
    pub async fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(target: "runtime::notice", "{}", notice.message),
            NoticeLevel::Warning => warn!(target: "runtime::notice", "{}", notice.message),
            NoticeLevel::Error => error!(target: "runtime::notice", "{}", notice.message),
        }
        self.activity.lock().await.push(notice.clone());
        self.bus.publish(Event::Notice(notice));
    }

    pub async fn activity_log(&self) -> Vec<Notice> {
        self.activity.lock().await.snapshot()
    }

    fn publish_queues(&self, world: &World) {
        self.bus
            .publish(Event::Queue(QueueEvent::from(world.queues())));
    }

    // ===== manual queue entry points =====

    pub async fn enqueue(&self, character: CharacterId, entry: ActionQueueEntry) -> Result<()> {
        let mut world = self.world.lock().await;
        match world.queues_mut().append(character, entry) {
            Ok(()) => {
                self.publish_queues(&world);
                Ok(())
            }
            Err(err) => {
                let name = display_name(&world, character);
                drop(world);
                self.notify(Notice::warning(format!("Could not queue action for {name}: {err}")))
                    .await;
                Err(err.into())
            }
        }
    }

    /// Empties one queue; an in-flight entry of `character` stops at its next poll.
    pub async fn clear_queue(&self, character: CharacterId) -> Result<()> {
        let mut world = self.world.lock().await;
        let touched = world.queues_mut().clear(character)?;
        self.publish_queues(&world);
        info!(
            target: "runtime::worker",
            character = %character,
            touched = ?touched,
            "queue cleared"
        );
        Ok(())
    }

    pub async fn clear_all_queues(&self) {
        let mut world = self.world.lock().await;
        world.queues_mut().clear_all();
        self.publish_queues(&world);
        info!(target: "runtime::worker", "all queues cleared");
    }

    pub async fn remove_character(&self, character: CharacterId) -> Option<Character> {
        let mut world = self.world.lock().await;
        let removed = world.despawn(character);
        if removed.is_some() {
            self.publish_queues(&world);
        }
        removed
    }
}

/// Display name for notices; falls back to the id of a departed character.
fn display_name(world: &World, character: CharacterId) -> String {
    world
        .character(character)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| character.to_string())
}
