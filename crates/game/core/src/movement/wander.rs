use rand::Rng;

use super::{MovementContext, Steer, steer};
use crate::state::{Character, Vec2};

/// Endless stroll between random points inside a square around the origin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wander {
    target: Vec2,
    speed: f32,
    range: f32,
    legs_completed: u32,
}

impl Wander {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, speed: f32, range: f32) -> Self {
        let range = range.abs();
        Self {
            target: Self::pick_target(rng, range),
            speed,
            range,
            legs_completed: 0,
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Number of random targets reached so far.
    pub fn legs_completed(&self) -> u32 {
        self.legs_completed
    }

    fn pick_target<R: Rng + ?Sized>(rng: &mut R, range: f32) -> Vec2 {
        if range <= f32::EPSILON {
            return Vec2::ORIGIN;
        }
        Vec2::new(rng.gen_range(-range..=range), rng.gen_range(-range..=range))
    }

    /// Never reports `true`: reaching a target just picks the next one.
    pub(super) fn update(
        &mut self,
        actor: Option<&mut Character>,
        dt: f32,
        ctx: &mut MovementContext<'_>,
    ) -> bool {
        let Some(actor) = actor else {
            return false;
        };

        if steer(actor, self.target, self.speed, dt, ctx.map) == Steer::Arrived {
            self.legs_completed = self.legs_completed.saturating_add(1);
            self.target = Self::pick_target(&mut *ctx.rng, self.range);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SpatialMap;
    use crate::state::CharacterId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn never_finishes() {
        let map = SpatialMap::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut actor = Character::new(CharacterId(3), "Swift", Vec2::ORIGIN);
        let mut wander = Wander::new(&mut rng, 4.0, 2.0);

        for _ in 0..10_000 {
            let mut ctx = MovementContext::new(&map, &mut rng);
            assert!(!wander.update(Some(&mut actor), 1.0 / 30.0, &mut ctx));
        }

        assert!(wander.legs_completed() > 0);
        assert!(actor.position.x.abs() <= 2.0 && actor.position.z.abs() <= 2.0);
    }

    #[test]
    fn targets_stay_inside_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let wander = Wander::new(&mut rng, 1.0, 5.0);
            assert!(wander.target().x.abs() <= 5.0);
            assert!(wander.target().z.abs() <= 5.0);
        }
    }

    #[test]
    fn leg_counter_saturates() {
        let map = SpatialMap::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut actor = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        // Zero range keeps the target on the actor, so every update completes a leg.
        let mut wander = Wander::new(&mut rng, 1.0, 0.0);
        wander.legs_completed = u32::MAX - 1;

        for _ in 0..3 {
            let mut ctx = MovementContext::new(&map, &mut rng);
            wander.update(Some(&mut actor), 0.1, &mut ctx);
        }

        assert_eq!(wander.legs_completed(), u32::MAX);
    }
}
