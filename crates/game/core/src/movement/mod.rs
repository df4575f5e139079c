//! Frame-stepped movement primitives.
//!
//! Each primitive is a small state struct rather than a closure, so a
//! movement can be inspected, cloned into a snapshot, or serialized between
//! frames. All of them share one contract:
//!
//! ```text
//! update(actor, dt, ctx) -> finished
//! ```
//!
//! - `actor` is `None` when the character vanished; the update is then a no-op
//!   that reports `false`.
//! - Positions are only committed when [`SpatialMap::collides`] says the new
//!   point is clear. A blocked character stalls for that frame, no sliding.
//! - [`Wander`] and [`TalkTo`] never report `true`; callers time-box them.
mod goto;
mod talk;
mod wander;

pub use goto::GoTo;
pub use talk::TalkTo;
pub use wander::Wander;

use rand::RngCore;

use crate::config::MovementConfig;
use crate::map::SpatialMap;
use crate::state::{AnimationState, Character, CharacterId, Vec2};

/// Side effects a movement raises while updating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MovementSignal {
    /// A TalkTo approach reached talking range for the first time.
    ConversationStarted {
        initiator: CharacterId,
        partner: CharacterId,
    },
}

/// Read-only world access plus an outbox for [`MovementSignal`]s.
pub struct MovementContext<'a> {
    map: &'a SpatialMap,
    rng: &'a mut dyn RngCore,
    signals: Vec<MovementSignal>,
}

impl<'a> MovementContext<'a> {
    pub fn new(map: &'a SpatialMap, rng: &'a mut dyn RngCore) -> Self {
        Self {
            map,
            rng,
            signals: Vec::new(),
        }
    }

    pub fn map(&self) -> &SpatialMap {
        self.map
    }

    pub fn emit(&mut self, signal: MovementSignal) {
        self.signals.push(signal);
    }

    pub fn signals(&self) -> &[MovementSignal] {
        &self.signals
    }

    pub fn into_signals(self) -> Vec<MovementSignal> {
        self.signals
    }
}

/// The movement currently authoritative over one character.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Movement {
    GoTo(GoTo),
    Wander(Wander),
    TalkTo(TalkTo),
}

impl Movement {
    /// Advances the movement by `dt` seconds.
    ///
    /// Returns `true` once the movement has finished.
    pub fn update(
        &mut self,
        actor: Option<&mut Character>,
        dt: f32,
        ctx: &mut MovementContext<'_>,
    ) -> bool {
        match self {
            Movement::GoTo(goto) => goto.update(actor, dt, ctx),
            Movement::Wander(wander) => wander.update(actor, dt, ctx),
            Movement::TalkTo(talk) => talk.update(actor, dt, ctx),
        }
    }
}

/// Outcome of one straight-line steering step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Steer {
    /// Already within the arrival threshold; nothing moved.
    Arrived,
    Moved,
    /// The proposed position would touch a wall; the actor stayed put.
    Blocked,
}

/// Moves `actor` toward `target` by at most `speed * dt`.
fn steer(actor: &mut Character, target: Vec2, speed: f32, dt: f32, map: &SpatialMap) -> Steer {
    let offset = target - actor.position;
    let distance = offset.length();
    if distance < MovementConfig::ARRIVAL_THRESHOLD {
        return Steer::Arrived;
    }

    let direction = offset * (1.0 / distance);
    actor.heading = direction.heading();

    let step = (speed * dt).max(0.0).min(distance);
    let proposed = actor.position + direction * step;
    if map.collides(proposed) {
        return Steer::Blocked;
    }

    actor.position = proposed;
    actor.set_animation(AnimationState::Run);
    Steer::Moved
}
