//! Data-driven town content and loaders.
//!
//! This crate reads the static inputs of the scheduler from RON/TOML files:
//! - Town map layout: rooms, furniture, talking areas and walls (RON)
//! - Character roster: names, profiles, spawn points and clips (RON)
//! - Runtime tuning (TOML, deserialized into the caller's config type)
//!
//! Loaded content is converted into `game-core` types once at startup and
//! never written back.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, MapLoader, RosterLoader};
