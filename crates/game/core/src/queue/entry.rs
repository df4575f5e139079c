use std::fmt;

use crate::state::CharacterId;

/// One pending step in a character's plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum ActionQueueEntry {
    /// Walk to a named waypoint.
    Goto { waypoint: String },
    /// Play a named expressive animation.
    Animation { name: String },
    /// Hold a conversation with `target`.
    ///
    /// Generated entries are always initiators; passive entries only come from
    /// manual queue edits and keep the character in place while talking.
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    TalkTo {
        target: CharacterId,
        is_initiator: bool,
    },
    /// Stroll around for the wander time box.
    Wander,
}

impl ActionQueueEntry {
    pub fn goto(waypoint: impl Into<String>) -> Self {
        ActionQueueEntry::Goto {
            waypoint: waypoint.into(),
        }
    }

    pub fn animation(name: impl Into<String>) -> Self {
        ActionQueueEntry::Animation { name: name.into() }
    }

    pub fn talk_to(target: CharacterId) -> Self {
        ActionQueueEntry::TalkTo {
            target,
            is_initiator: true,
        }
    }

    /// The conversation target when this entry starts a conversation.
    pub fn initiated_talk_target(&self) -> Option<CharacterId> {
        match self {
            ActionQueueEntry::TalkTo {
                target,
                is_initiator: true,
            } => Some(*target),
            _ => None,
        }
    }

    /// True when this entry involves `character` as a talk target.
    pub fn targets(&self, character: CharacterId) -> bool {
        matches!(self, ActionQueueEntry::TalkTo { target, .. } if *target == character)
    }
}

impl fmt::Display for ActionQueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionQueueEntry::Goto { waypoint } => write!(f, "go to {waypoint}"),
            ActionQueueEntry::Animation { name } => write!(f, "play {name}"),
            ActionQueueEntry::TalkTo {
                target,
                is_initiator: true,
            } => write!(f, "talk to {target}"),
            ActionQueueEntry::TalkTo { target, .. } => write!(f, "listen to {target}"),
            ActionQueueEntry::Wander => f.write_str("wander"),
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn talk_entries_use_camel_case_on_the_wire() {
        let entry = ActionQueueEntry::TalkTo {
            target: CharacterId(3),
            is_initiator: false,
        };

        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "type": "talkTo", "target": 3, "isInitiator": false })
        );
        assert_eq!(serde_json::from_value::<ActionQueueEntry>(json).unwrap(), entry);
    }

    #[test]
    fn unit_and_struct_variants_carry_the_type_tag() {
        assert_eq!(
            serde_json::to_value(ActionQueueEntry::Wander).unwrap(),
            serde_json::json!({ "type": "wander" })
        );
        assert_eq!(
            serde_json::to_value(ActionQueueEntry::goto("cafe")).unwrap(),
            serde_json::json!({ "type": "goto", "waypoint": "cafe" })
        );
    }
}
