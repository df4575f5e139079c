use std::collections::BTreeMap;
use std::sync::Arc;

use rand::RngCore;

use super::character::{AnimationState, Character};
use super::common::CharacterId;
use crate::config::MovementConfig;
use crate::conversation::ConversationStore;
use crate::error::{ActionError, WorldError};
use crate::map::SpatialMap;
use crate::movement::{GoTo, Movement, MovementContext, MovementSignal, TalkTo, Wander};
use crate::queue::ActionQueues;

/// Result of advancing one character's active movement by a frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementTick {
    /// The movement reported completion and has been released.
    pub finished: bool,
    pub signals: Vec<MovementSignal>,
}

/// Owner of every piece of mutable simulation state.
///
/// Characters and their queues are created together on [`World::spawn`] and
/// dropped together on [`World::despawn`]; there is no other way to add or
/// remove a queue.
#[derive(Clone, Debug)]
pub struct World {
    map: Arc<SpatialMap>,
    characters: BTreeMap<CharacterId, Character>,
    queues: ActionQueues,
    conversations: ConversationStore,
    config: MovementConfig,
}

impl World {
    pub fn new(map: Arc<SpatialMap>, config: MovementConfig) -> Self {
        Self {
            map,
            characters: BTreeMap::new(),
            queues: ActionQueues::new(),
            conversations: ConversationStore::new(),
            config,
        }
    }

    // ===== roster =====

    /// Adds `character` with an empty queue.
    pub fn spawn(&mut self, character: Character) -> Result<(), WorldError> {
        if self.characters.contains_key(&character.id) {
            return Err(WorldError::DuplicateCharacter(character.id));
        }
        if self.find_by_name(&character.name).is_some() {
            return Err(WorldError::DuplicateName(character.name));
        }

        self.queues.register(character.id);
        self.characters.insert(character.id, character);
        Ok(())
    }

    /// Removes a character, its queue, and talk entries aimed at it.
    pub fn despawn(&mut self, id: CharacterId) -> Option<Character> {
        let character = self.characters.remove(&id)?;
        self.queues.unregister(id);
        Some(character)
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Characters in ascending id order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn ids(&self) -> Vec<CharacterId> {
        self.characters.keys().copied().collect()
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Character> {
        let name = name.trim();
        self.characters
            .values()
            .find(|character| character.name.eq_ignore_ascii_case(name))
    }

    // ===== owned stores =====

    pub fn queues(&self) -> &ActionQueues {
        &self.queues
    }

    pub fn queues_mut(&mut self) -> &mut ActionQueues {
        &mut self.queues
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn conversations_mut(&mut self) -> &mut ConversationStore {
        &mut self.conversations
    }

    pub fn map(&self) -> &Arc<SpatialMap> {
        &self.map
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    // ===== action primitives =====

    fn existing_mut(&mut self, id: CharacterId) -> Result<&mut Character, ActionError> {
        self.characters
            .get_mut(&id)
            .ok_or(ActionError::StaleCharacter(id))
    }

    pub fn play(&mut self, id: CharacterId, state: AnimationState) -> Result<(), ActionError> {
        self.existing_mut(id)?.play(state)
    }

    pub fn stand(&mut self, id: CharacterId) -> Result<(), ActionError> {
        self.existing_mut(id)?.stand();
        Ok(())
    }

    pub fn assign_movement(
        &mut self,
        id: CharacterId,
        movement: Movement,
    ) -> Result<(), ActionError> {
        self.existing_mut(id)?.assign_movement(movement);
        Ok(())
    }

    /// Drops the character's active movement; a missing character is ignored.
    pub fn release_movement(&mut self, id: CharacterId) -> Option<Movement> {
        self.characters
            .get_mut(&id)
            .and_then(Character::release_movement)
    }

    /// Starts walking `id` to `waypoint` at the configured walk speed.
    pub fn start_goto(&mut self, id: CharacterId, waypoint: &str) -> Result<(), ActionError> {
        let goto = GoTo::new(&self.map, waypoint, self.config.walk_speed)?;
        self.assign_movement(id, Movement::GoTo(goto))
    }

    pub fn start_wander(
        &mut self,
        id: CharacterId,
        rng: &mut dyn RngCore,
    ) -> Result<(), ActionError> {
        let wander = Wander::new(rng, self.config.wander_speed, self.config.wander_range);
        self.assign_movement(id, Movement::Wander(wander))
    }

    /// Sends `id` toward `partner`'s current position.
    pub fn start_talk(&mut self, id: CharacterId, partner: CharacterId) -> Result<(), ActionError> {
        if id == partner {
            return Err(ActionError::SelfConversation(id));
        }
        let talk = TalkTo::new(
            self.character(partner)
                .ok_or(ActionError::StaleCharacter(partner))?,
            self.config.walk_speed,
        );
        self.assign_movement(id, Movement::TalkTo(talk))
    }

    /// Ends a conversation: both sides lose their movement and stand.
    pub fn end_conversation(&mut self, a: CharacterId, b: CharacterId) {
        for id in [a, b] {
            if let Some(character) = self.characters.get_mut(&id) {
                character.release_movement();
                character.stand();
            }
        }
    }

    /// Advances `id`'s active movement by `dt` seconds.
    ///
    /// A finished movement is released; otherwise it stays assigned.
    pub fn advance_movement(
        &mut self,
        id: CharacterId,
        dt: f32,
        rng: &mut dyn RngCore,
    ) -> Result<MovementTick, ActionError> {
        let character = self
            .characters
            .get_mut(&id)
            .ok_or(ActionError::StaleCharacter(id))?;
        let mut movement = character
            .take_movement()
            .ok_or(ActionError::NoActiveMovement(id))?;

        let mut ctx = MovementContext::new(&self.map, rng);
        let finished = movement.update(Some(character), dt, &mut ctx);
        if !finished {
            character.restore_movement(movement);
        }

        Ok(MovementTick {
            finished,
            signals: ctx.into_signals(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Waypoint, WaypointKind};
    use crate::queue::ActionQueueEntry;
    use crate::state::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const MONET: CharacterId = CharacterId(1);
    const SWIFT: CharacterId = CharacterId(2);

    fn world() -> World {
        let map = SpatialMap::new(
            [Waypoint {
                id: "cafe".into(),
                position: Vec2::new(4.0, 0.0),
                kind: WaypointKind::Room { room: "cafe".into() },
            }],
            [],
        )
        .unwrap();
        let mut world = World::new(Arc::new(map), MovementConfig::default());
        world
            .spawn(Character::new(MONET, "Monet", Vec2::ORIGIN))
            .unwrap();
        world
            .spawn(Character::new(SWIFT, "Swift", Vec2::new(6.0, 0.0)))
            .unwrap();
        world
    }

    #[test]
    fn spawn_rejects_duplicates_and_registers_queue() {
        let mut world = world();
        assert_eq!(
            world.spawn(Character::new(MONET, "Other", Vec2::ORIGIN)),
            Err(WorldError::DuplicateCharacter(MONET))
        );
        assert_eq!(
            world.spawn(Character::new(CharacterId(3), "monet", Vec2::ORIGIN)),
            Err(WorldError::DuplicateName("monet".into()))
        );
        assert!(world.queues().contains(SWIFT));
        assert_eq!(world.find_by_name(" SWIFT ").map(|c| c.id), Some(SWIFT));
    }

    #[test]
    fn advance_releases_finished_goto() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(0);
        world.start_goto(MONET, "cafe").unwrap();

        let mut finished = false;
        for _ in 0..200 {
            if world.advance_movement(MONET, 1.0 / 60.0, &mut rng).unwrap().finished {
                finished = true;
                break;
            }
        }

        assert!(finished);
        let monet = world.character(MONET).unwrap();
        assert!(!monet.has_active_movement());
        assert_eq!(monet.position, Vec2::new(4.0, 0.0));
        assert_eq!(
            world.advance_movement(MONET, 1.0 / 60.0, &mut rng),
            Err(ActionError::NoActiveMovement(MONET))
        );
    }

    #[test]
    fn goto_to_unknown_waypoint_assigns_nothing() {
        let mut world = world();
        assert!(matches!(
            world.start_goto(MONET, "moon"),
            Err(ActionError::Movement(_))
        ));
        assert!(!world.character(MONET).unwrap().has_active_movement());
    }

    #[test]
    fn despawned_character_is_stale_everywhere() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(0);
        world
            .queues_mut()
            .append(MONET, ActionQueueEntry::talk_to(SWIFT))
            .unwrap();

        assert!(world.despawn(SWIFT).is_some());

        assert!(world.queues().get(MONET).unwrap().is_empty());
        assert_eq!(
            world.start_talk(MONET, SWIFT),
            Err(ActionError::StaleCharacter(SWIFT))
        );
        assert_eq!(
            world.advance_movement(SWIFT, 0.1, &mut rng),
            Err(ActionError::StaleCharacter(SWIFT))
        );
    }

    #[test]
    fn end_conversation_returns_both_to_stand() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(0);
        world.start_talk(MONET, SWIFT).unwrap();
        world.play(SWIFT, AnimationState::Talking).unwrap();

        let mut signals = Vec::new();
        for _ in 0..120 {
            signals.extend(world.advance_movement(MONET, 1.0 / 60.0, &mut rng).unwrap().signals);
        }
        assert_eq!(signals.len(), 1);

        world.end_conversation(MONET, SWIFT);
        for id in [MONET, SWIFT] {
            let character = world.character(id).unwrap();
            assert_eq!(character.animation(), &AnimationState::Stand);
            assert!(!character.has_active_movement());
        }
    }

    #[test]
    fn self_conversation_is_rejected() {
        let mut world = world();
        assert_eq!(
            world.start_talk(MONET, MONET),
            Err(ActionError::SelfConversation(MONET))
        );
    }
}
