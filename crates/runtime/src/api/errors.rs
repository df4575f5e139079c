//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, the queue store, and providers so
//! clients can bubble them up with consistent context.
use std::fmt;

use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{CharacterId, QueueError, WorldError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{kind} provider not set")]
    ProviderNotSet { kind: ProviderKind },

    #[error("runtime requires a town map before building")]
    MissingMap,

    #[error("scheduler command channel closed")]
    CommandChannelClosed,

    #[error("scheduler reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("runtime worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    /// Generation and execution share one in-flight slot.
    #[error("a generation or execution round is already in flight")]
    RoundInFlight,

    /// One character's provider response was unusable; nothing was committed.
    #[error("generation incomplete for {character}: {reason}")]
    GenerationIncomplete {
        character: CharacterId,
        reason: String,
    },

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    World(#[from] WorldError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Action,
    Dialogue,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Action => "action",
            ProviderKind::Dialogue => "dialogue",
        };
        write!(f, "{}", label)
    }
}
