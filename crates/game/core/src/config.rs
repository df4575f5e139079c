/// Movement tuning shared by every movement primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MovementConfig {
    /// Speed used by GoTo and TalkTo approaches, in units per second.
    pub walk_speed: f32,
    /// Default Wander speed when no override is given.
    pub wander_speed: f32,
    /// Half-width of the square around the origin that Wander samples from.
    pub wander_range: f32,
}

impl MovementConfig {
    // ===== fixed geometry thresholds =====
    /// Remaining distance under which a destination counts as reached.
    pub const ARRIVAL_THRESHOLD: f32 = 0.1;
    /// Distance at which a TalkTo approach stops and the conversation begins.
    pub const TALK_RANGE: f32 = 2.0;
    /// Minimum clearance between a character and any wall segment.
    pub const WALL_CLEARANCE: f32 = 0.5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WALK_SPEED: f32 = 3.0;
    pub const DEFAULT_WANDER_SPEED: f32 = 1.5;
    pub const DEFAULT_WANDER_RANGE: f32 = 10.0;

    pub fn new() -> Self {
        Self {
            walk_speed: Self::DEFAULT_WALK_SPEED,
            wander_speed: Self::DEFAULT_WANDER_SPEED,
            wander_range: Self::DEFAULT_WANDER_RANGE,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::new()
    }
}
