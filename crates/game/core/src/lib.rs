//! Deterministic NPC scheduling logic and data types shared across crates.
//!
//! `game-core` defines the canonical building blocks of the action-queue
//! scheduler: the static [`map::SpatialMap`], characters and their animation
//! state, the per-character [`queue::ActionQueues`], round conflict
//! resolution, and the movement primitives that integrate character motion
//! frame by frame. Everything here is synchronous and clock-free; timing and
//! concurrency live in the `runtime` crate. All mutable simulation state is
//! owned by a single [`state::World`] value.
pub mod config;
pub mod conversation;
pub mod error;
pub mod map;
pub mod movement;
pub mod queue;
pub mod state;

pub use config::MovementConfig;
pub use conversation::{Conversation, ConversationId, ConversationLine, ConversationStore};
pub use error::{ActionError, ConversationError, MapError, MovementError, QueueError, WorldError};
pub use map::{SpatialMap, WallOrientation, WallSegment, Waypoint, WaypointKind};
pub use movement::{GoTo, Movement, MovementContext, MovementSignal, TalkTo, Wander};
pub use queue::{
    ActionQueueEntry, ActionQueues, CharacterQueue, QUEUE_CAPACITY, RoundPlan, TalkConflict,
};
pub use state::{
    AnimationState, Character, CharacterId, Emote, MovementTick, Profile, Vec2, World,
};
