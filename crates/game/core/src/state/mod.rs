//! Authoritative simulation state representation.
//!
//! This module owns the data structures that describe characters, their
//! animation state, and the [`World`] container that ties characters, queues,
//! the static map and the conversation store together. Runtime layers lock or
//! snapshot this state but never keep module-level character singletons.
mod character;
mod common;
mod world;

pub use character::{AnimationState, Character, Emote, Profile};
pub use common::{CharacterId, Vec2};
pub use world::{MovementTick, World};
