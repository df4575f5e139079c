//! Async orchestration for the NPC action-queue scheduler.
//!
//! This crate wires the provider abstraction, the round generator, the
//! lockstep executor and the worker tasks into a cohesive runtime API.
//! Consumers embed [`Runtime`] to drive rounds, subscribe to events, and
//! edit queues through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus and activity log
//! - [`providers`] ships offline action and dialogue providers
//! - the scheduler and workers stay internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod runtime;

mod scheduler;
mod workers;

pub use api::{
    ACTIONS_PER_ROUND, ActionProvider, ActionRequest, CharacterBrief, DialogueProvider,
    DialogueRequest, PeerBrief, ProposedAction, ProviderError, ProviderKind, Result, RuntimeError,
    RuntimeHandle,
};
pub use events::{
    ActivityLog, ConversationEvent, EntryOutcome, Event, EventBus, ExecutionEvent, ExecutorPhase,
    Notice, NoticeLevel, QueueEvent, Topic,
};
pub use providers::{RandomProvider, ScriptedProvider, TemplateDialogue};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, SchedulerConfig};
pub use scheduler::{ExecutionReport, RoundSummary};
