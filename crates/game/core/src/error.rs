//! Error types raised by the scheduling core.
//!
//! Each enum covers one concern so callers can decide locally whether a
//! failure is recoverable (queue full, missing waypoint) or should abort a
//! whole round (length mismatch).

use crate::state::CharacterId;

/// Errors raised by the action queue store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// No queue is registered for this character.
    #[error("no action queue registered for character {0}")]
    UnknownCharacter(CharacterId),

    /// Append attempted on a queue that already holds `capacity` entries.
    #[error("action queue of {character} is full (capacity: {capacity})")]
    QueueFull {
        character: CharacterId,
        capacity: usize,
    },

    /// Non-empty queues disagree on their length, so lockstep execution is impossible.
    #[error("queue lengths differ: {}", format_lengths(.lengths))]
    LengthMismatch { lengths: Vec<(CharacterId, usize)> },
}

fn format_lengths(lengths: &[(CharacterId, usize)]) -> String {
    lengths
        .iter()
        .map(|(id, len)| format!("{id}={len}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while creating movement primitives.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MovementError {
    #[error("checkpoint '{0}' not found on the map")]
    CheckpointNotFound(String),
}

/// Errors raised while building a [`crate::map::SpatialMap`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("duplicate waypoint id '{0}'")]
    DuplicateWaypoint(String),
}

/// Errors raised by [`crate::state::World`] roster management.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("character {0} is already spawned")]
    DuplicateCharacter(CharacterId),

    #[error("character name '{0}' is already taken")]
    DuplicateName(String),
}

/// Errors raised while executing a single queue entry for one character.
///
/// These never abort a round: the executor logs them and counts the entry as
/// complete.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The character was removed from the world while an action referenced it.
    #[error("character {0} is no longer in the world")]
    StaleCharacter(CharacterId),

    #[error("character {character} has no animation clip '{animation}'")]
    UnknownAnimation {
        character: CharacterId,
        animation: String,
    },

    #[error("character {0} has no active movement")]
    NoActiveMovement(CharacterId),

    #[error("character {0} cannot talk to itself")]
    SelfConversation(CharacterId),

    #[error(transparent)]
    Movement(#[from] MovementError),
}

/// Errors raised by the conversation store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("conversation #{0} does not exist")]
    UnknownConversation(u32),

    #[error("{speaker} is not a participant of conversation #{conversation}")]
    NotAParticipant {
        conversation: u32,
        speaker: CharacterId,
    },
}
