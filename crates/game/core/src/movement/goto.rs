use super::{MovementContext, Steer, steer};
use crate::error::MovementError;
use crate::map::SpatialMap;
use crate::state::{AnimationState, Character, Vec2};

/// Straight-line walk to a named waypoint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoTo {
    waypoint: String,
    target: Vec2,
    speed: f32,
    finished: bool,
}

impl GoTo {
    /// Resolves `waypoint` on `map`.
    ///
    /// Fails with [`MovementError::CheckpointNotFound`] when the id is unknown;
    /// callers must not schedule frame updates in that case.
    pub fn new(map: &SpatialMap, waypoint: &str, speed: f32) -> Result<Self, MovementError> {
        let target = map
            .resolve(waypoint)
            .ok_or_else(|| MovementError::CheckpointNotFound(waypoint.to_string()))?;

        Ok(Self {
            waypoint: waypoint.to_string(),
            target,
            speed,
            finished: false,
        })
    }

    pub fn waypoint(&self) -> &str {
        &self.waypoint
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(super) fn update(
        &mut self,
        actor: Option<&mut Character>,
        dt: f32,
        ctx: &mut MovementContext<'_>,
    ) -> bool {
        let Some(actor) = actor else {
            return false;
        };
        if self.finished {
            return true;
        }

        match steer(actor, self.target, self.speed, dt, ctx.map()) {
            Steer::Arrived => {
                // Snap so repeated small steps never leave a residue.
                actor.position = self.target;
                actor.set_animation(AnimationState::Stand);
                self.finished = true;
                true
            }
            Steer::Moved | Steer::Blocked => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{WallOrientation, WallSegment, Waypoint, WaypointKind};
    use crate::movement::Movement;
    use crate::state::CharacterId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn map(walls: Vec<WallSegment>) -> SpatialMap {
        SpatialMap::new(
            [Waypoint {
                id: "easel".into(),
                position: Vec2::new(10.0, 0.0),
                kind: WaypointKind::Furniture {
                    room: "studio".into(),
                },
            }],
            walls,
        )
        .unwrap()
    }

    #[test]
    fn converges_exactly_on_target() {
        let map = map(vec![]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut actor = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        let mut movement = Movement::GoTo(GoTo::new(&map, "easel", 3.0).unwrap());

        let mut finished_at = None;
        for frame in 0..1_000 {
            let mut ctx = MovementContext::new(&map, &mut rng);
            if movement.update(Some(&mut actor), 1.0 / 60.0, &mut ctx) {
                finished_at = Some(frame);
                break;
            }
            assert_eq!(actor.animation(), &AnimationState::Run);
        }

        assert!(finished_at.is_some_and(|frame| frame <= 250));
        assert_eq!(actor.position, Vec2::new(10.0, 0.0));
        assert_eq!(actor.animation(), &AnimationState::Stand);
    }

    #[test]
    fn unknown_checkpoint_fails_creation() {
        let map = map(vec![]);
        assert_eq!(
            GoTo::new(&map, "volcano", 3.0).unwrap_err(),
            MovementError::CheckpointNotFound("volcano".into())
        );
    }

    #[test]
    fn stalls_in_front_of_wall() {
        let wall = WallSegment::new(
            Vec2::new(1.0, -5.0),
            Vec2::new(1.0, 5.0),
            WallOrientation::Vertical,
        );
        let map = map(vec![wall]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut actor = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        let mut goto = GoTo::new(&map, "easel", 3.0).unwrap();

        for _ in 0..600 {
            let mut ctx = MovementContext::new(&map, &mut rng);
            assert!(!goto.update(Some(&mut actor), 1.0 / 60.0, &mut ctx));
        }

        assert!(actor.position.x < 0.5 + f32::EPSILON);
        assert_eq!(actor.position.z, 0.0);
    }

    #[test]
    fn missing_actor_is_a_no_op() {
        let map = map(vec![]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut goto = GoTo::new(&map, "easel", 3.0).unwrap();
        let mut ctx = MovementContext::new(&map, &mut rng);

        assert!(!goto.update(None, 1.0 / 60.0, &mut ctx));
        assert!(!goto.is_finished());
    }
}
