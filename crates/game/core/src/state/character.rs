use std::collections::BTreeSet;
use std::fmt;

use strum::VariantArray;

use super::common::{CharacterId, Vec2};
use crate::error::ActionError;
use crate::movement::Movement;

/// Expressive animations every character model ships with.
///
/// Talk-conflict resolution replaces a rejected `TalkTo` with one of these,
/// so they must be playable by any character.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::IntoStaticStr,
    strum::VariantArray,
)]
pub enum Emote {
    Wave,
    Dance,
    Clap,
    Jump,
    Bow,
    Cheer,
}

impl Emote {
    /// Clip name as registered on the character model.
    pub fn clip(self) -> &'static str {
        self.into()
    }
}

/// Animation currently playing on a character.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationState {
    #[default]
    Stand,
    Run,
    Talking,
    /// A named clip such as `Wave` or `Dance`.
    Expressive(String),
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationState::Stand => f.write_str("Stand"),
            AnimationState::Run => f.write_str("Run"),
            AnimationState::Talking => f.write_str("Talking"),
            AnimationState::Expressive(name) => f.write_str(name),
        }
    }
}

/// Personality payload forwarded to the action provider.
///
/// The scheduler never interprets these fields.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Profile {
    pub occupation: String,
    pub mbti: String,
    pub hobby: String,
    pub traits: Vec<String>,
    pub needs: Vec<String>,
    pub goals: Vec<String>,
}

/// A simulated character and the single movement currently driving it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub profile: Profile,
    pub position: Vec2,
    /// Rotation around the vertical axis, in radians.
    pub heading: f32,
    animation: AnimationState,
    clips: BTreeSet<String>,
    movement: Option<Movement>,
}

impl Character {
    /// Creates a standing character that can play every [`Emote`].
    pub fn new(id: CharacterId, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            profile: Profile::default(),
            position,
            heading: 0.0,
            animation: AnimationState::Stand,
            clips: Emote::VARIANTS
                .iter()
                .map(|emote| emote.clip().to_string())
                .collect(),
            movement: None,
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Registers additional expressive clips the model provides.
    pub fn with_clips<I, S>(mut self, clips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clips.extend(clips.into_iter().map(Into::into));
        self
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains(name)
    }

    pub fn clips(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(String::as_str)
    }

    /// Plays `state`, rejecting expressive clips the model does not have.
    pub fn play(&mut self, state: AnimationState) -> Result<(), ActionError> {
        if let AnimationState::Expressive(name) = &state
            && !self.clips.contains(name)
        {
            return Err(ActionError::UnknownAnimation {
                character: self.id,
                animation: name.clone(),
            });
        }
        self.animation = state;
        Ok(())
    }

    /// Stops whatever is playing and returns to the idle pose.
    pub fn stand(&mut self) {
        self.animation = AnimationState::Stand;
    }

    pub(crate) fn set_animation(&mut self, state: AnimationState) {
        if self.animation != state {
            self.animation = state;
        }
    }

    pub fn movement(&self) -> Option<&Movement> {
        self.movement.as_ref()
    }

    pub fn has_active_movement(&self) -> bool {
        self.movement.is_some()
    }

    /// Makes `movement` the single authority over this character's position.
    ///
    /// Any previous movement is released first so its animation does not keep
    /// playing under the new one.
    pub fn assign_movement(&mut self, movement: Movement) {
        self.release_movement();
        self.movement = Some(movement);
    }

    /// Drops the active movement (if any) and returns to Stand.
    pub fn release_movement(&mut self) -> Option<Movement> {
        let previous = self.movement.take();
        if previous.is_some() {
            self.stand();
        }
        previous
    }

    pub(crate) fn take_movement(&mut self) -> Option<Movement> {
        self.movement.take()
    }

    pub(crate) fn restore_movement(&mut self, movement: Movement) {
        self.movement = Some(movement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::Wander;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn new_characters_can_play_every_emote() {
        let mut character = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        for emote in Emote::VARIANTS {
            character
                .play(AnimationState::Expressive(emote.to_string()))
                .unwrap();
        }
        assert_eq!(
            character.animation(),
            &AnimationState::Expressive("Cheer".into())
        );
    }

    #[test]
    fn unknown_clip_is_rejected_and_pose_is_kept() {
        let mut character = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        let err = character
            .play(AnimationState::Expressive("Backflip".into()))
            .unwrap_err();

        assert!(matches!(err, ActionError::UnknownAnimation { .. }));
        assert_eq!(character.animation(), &AnimationState::Stand);
    }

    #[test]
    fn assigning_movement_releases_previous_animation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut character = Character::new(CharacterId(1), "Monet", Vec2::ORIGIN);
        character.assign_movement(Movement::Wander(Wander::new(&mut rng, 1.0, 5.0)));
        character.set_animation(AnimationState::Run);

        character.assign_movement(Movement::Wander(Wander::new(&mut rng, 1.0, 5.0)));

        assert_eq!(character.animation(), &AnimationState::Stand);
        assert!(character.has_active_movement());
    }
}
