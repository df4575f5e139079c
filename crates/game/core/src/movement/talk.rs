use super::{MovementContext, MovementSignal, steer};
use crate::config::MovementConfig;
use crate::state::{AnimationState, Character, CharacterId, Vec2};

/// Approach a partner and hold a conversation pose.
///
/// The partner's position is captured once at creation; a partner that keeps
/// moving is not chased.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TalkTo {
    partner: CharacterId,
    meeting_point: Vec2,
    speed: f32,
    engaged: bool,
}

impl TalkTo {
    pub fn new(partner: &Character, speed: f32) -> Self {
        Self {
            partner: partner.id,
            meeting_point: partner.position,
            speed,
            engaged: false,
        }
    }

    pub fn partner(&self) -> CharacterId {
        self.partner
    }

    pub fn meeting_point(&self) -> Vec2 {
        self.meeting_point
    }

    /// True once the conversation has been started.
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Never reports `true`; the caller ends the conversation.
    pub(super) fn update(
        &mut self,
        actor: Option<&mut Character>,
        dt: f32,
        ctx: &mut MovementContext<'_>,
    ) -> bool {
        let Some(actor) = actor else {
            return false;
        };

        if self.engaged {
            actor.set_animation(AnimationState::Talking);
            return false;
        }

        if actor.position.distance(self.meeting_point) <= MovementConfig::TALK_RANGE {
            self.engaged = true;
            let facing = self.meeting_point - actor.position;
            if facing.length_squared() > f32::EPSILON {
                actor.heading = facing.heading();
            }
            actor.set_animation(AnimationState::Talking);
            ctx.emit(MovementSignal::ConversationStarted {
                initiator: actor.id,
                partner: self.partner,
            });
            return false;
        }

        steer(actor, self.meeting_point, self.speed, dt, ctx.map);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SpatialMap;
    use crate::movement::Movement;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn approaches_snapshot_and_starts_conversation_once() {
        let map = SpatialMap::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut monet = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        let mut swift = Character::new(CharacterId(2), "Swift", Vec2::new(8.0, 0.0));
        let mut movement = Movement::TalkTo(TalkTo::new(&swift, 3.0));

        // The partner walks away after the snapshot; the approach ignores it.
        swift.position = Vec2::new(50.0, 50.0);

        let mut started = 0;
        for _ in 0..600 {
            let mut ctx = MovementContext::new(&map, &mut rng);
            assert!(!movement.update(Some(&mut monet), 1.0 / 60.0, &mut ctx));
            started += ctx.signals().len();
        }

        assert_eq!(started, 1);
        assert_eq!(monet.animation(), &AnimationState::Talking);
        let gap = monet.position.distance(Vec2::new(8.0, 0.0));
        assert!(gap <= MovementConfig::TALK_RANGE && gap > 1.9);
    }

    #[test]
    fn already_in_range_engages_immediately() {
        let map = SpatialMap::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut monet = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        let swift = Character::new(CharacterId(2), "Swift", Vec2::new(1.0, 1.0));
        let mut talk = TalkTo::new(&swift, 3.0);

        let mut ctx = MovementContext::new(&map, &mut rng);
        talk.update(Some(&mut monet), 1.0 / 60.0, &mut ctx);

        assert!(talk.is_engaged());
        assert_eq!(
            ctx.into_signals(),
            vec![MovementSignal::ConversationStarted {
                initiator: CharacterId(1),
                partner: CharacterId(2),
            }]
        );
        assert_eq!(monet.position, Vec2::ORIGIN);
    }
}
