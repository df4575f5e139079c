//! Asynchronous abstraction for sourcing NPC intent and dialogue.
//!
//! Runtime users plug in [`ActionProvider`] and [`DialogueProvider`]
//! implementations so the scheduler can run against a language model, scripted
//! fixtures, or random policies. Providers never touch the world: they receive
//! a plain snapshot and return plain data.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use game_core::{Character, CharacterId, ConversationId, ConversationLine, Vec2};

/// Number of actions every character must receive per generation round.
pub const ACTIONS_PER_ROUND: usize = game_core::QUEUE_CAPACITY;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("invalid provider payload")]
    Json(#[from] serde_json::Error),

    #[error("no scripted response left for '{0}'")]
    Exhausted(String),
}

/// One action as proposed by an [`ActionProvider`].
///
/// The JSON shape is the wire contract with external oracles:
///
/// ```json
/// {"type": "goto", "checkpoint": "cafe"}
/// {"type": "animation", "animation": "Wave"}
/// {"type": "talkTo", "targetName": "Swift"}
/// {"type": "wander"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProposedAction {
    Goto {
        checkpoint: String,
    },
    Animation {
        animation: String,
    },
    #[serde(rename_all = "camelCase")]
    TalkTo {
        target_name: String,
    },
    Wander,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActionPayload {
    List(Vec<ProposedAction>),
    Wrapped { actions: Vec<ProposedAction> },
}

impl ProposedAction {
    pub fn goto(checkpoint: impl Into<String>) -> Self {
        ProposedAction::Goto {
            checkpoint: checkpoint.into(),
        }
    }

    pub fn animation(animation: impl Into<String>) -> Self {
        ProposedAction::Animation {
            animation: animation.into(),
        }
    }

    pub fn talk_to(target_name: impl Into<String>) -> Self {
        ProposedAction::TalkTo {
            target_name: target_name.into(),
        }
    }

    /// Parses an oracle payload: either a bare array of actions or an object
    /// with an `actions` array.
    pub fn parse_list(payload: &str) -> Result<Vec<ProposedAction>, ProviderError> {
        let parsed: ActionPayload = serde_json::from_str(payload)?;
        Ok(match parsed {
            ActionPayload::List(actions) | ActionPayload::Wrapped { actions } => actions,
        })
    }
}

/// Public profile of the character an action request is for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterBrief {
    pub id: CharacterId,
    pub name: String,
    pub occupation: String,
    pub mbti: String,
    pub hobby: String,
    pub traits: Vec<String>,
    pub needs: Vec<String>,
    pub goals: Vec<String>,
    pub position: Vec2,
}

impl From<&Character> for CharacterBrief {
    fn from(character: &Character) -> Self {
        let profile = &character.profile;
        Self {
            id: character.id,
            name: character.name.clone(),
            occupation: profile.occupation.clone(),
            mbti: profile.mbti.clone(),
            hobby: profile.hobby.clone(),
            traits: profile.traits.clone(),
            needs: profile.needs.clone(),
            goals: profile.goals.clone(),
            position: character.position,
        }
    }
}

/// What a character knows about the other residents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerBrief {
    pub id: CharacterId,
    pub name: String,
    pub occupation: String,
    pub mbti: String,
}

impl From<&Character> for PeerBrief {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            occupation: character.profile.occupation.clone(),
            mbti: character.profile.mbti.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub character: CharacterBrief,
    /// Every other character, in id order.
    pub peers: Vec<PeerBrief>,
    /// Waypoint ids a `goto` may name.
    pub waypoints: Vec<String>,
    /// Expressive clips this character can play.
    pub animations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DialogueRequest {
    pub conversation: ConversationId,
    pub speaker: CharacterBrief,
    pub listener: CharacterBrief,
    /// Lines spoken so far, oldest first.
    pub history: Vec<ConversationLine>,
}

/// Trait for proposing a character's next round of actions.
///
/// Implementations should return exactly [`ACTIONS_PER_ROUND`] actions; any
/// other count fails the whole round.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    async fn propose_actions(
        &self,
        request: &ActionRequest,
    ) -> Result<Vec<ProposedAction>, ProviderError>;
}

/// Trait for producing conversation lines once two characters meet.
#[async_trait]
pub trait DialogueProvider: Send + Sync {
    async fn next_line(&self, request: &DialogueRequest) -> Result<String, ProviderError>;
}
