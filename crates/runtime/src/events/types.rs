//! Event types for different topics.

use serde::{Deserialize, Serialize};

use game_core::{ActionQueueEntry, ActionQueues, CharacterId, ConversationId, ConversationLine};

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Human-readable system message for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// How long the UI should keep the notice on screen; `None` means until
    /// replaced.
    pub display_ms: Option<u64>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            display_ms: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            display_ms: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            display_ms: None,
        }
    }

    pub fn displayed_for(mut self, display_ms: u64) -> Self {
        self.display_ms = Some(display_ms);
        self
    }
}

/// Snapshot of every queue after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub queues: Vec<(CharacterId, Vec<ActionQueueEntry>)>,
}

impl From<&ActionQueues> for QueueEvent {
    fn from(queues: &ActionQueues) -> Self {
        Self {
            queues: queues
                .iter()
                .map(|(id, queue)| (id, queue.entries().to_vec()))
                .collect(),
        }
    }
}

/// Lockstep executor state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutorPhase {
    #[default]
    Idle,
    Validating,
    Executing { step: usize },
    Draining,
}

/// How a single queue entry ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOutcome {
    Completed,
    /// The character's queue was cleared while the entry was running.
    Cancelled,
    /// A GoTo never arrived before its timeout.
    TimedOut,
    /// The entry failed; it still counts as complete for the barrier.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionEvent {
    PhaseChanged(ExecutorPhase),
    EntryStarted {
        character: CharacterId,
        step: usize,
        entry: ActionQueueEntry,
    },
    EntryFinished {
        character: CharacterId,
        step: usize,
        outcome: EntryOutcome,
    },
    RoundCompleted {
        steps: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationEvent {
    Started {
        conversation: ConversationId,
        initiator: CharacterId,
        partner: CharacterId,
    },
    Line {
        conversation: ConversationId,
        line: ConversationLine,
    },
    Ended {
        conversation: ConversationId,
    },
}
