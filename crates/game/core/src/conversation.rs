//! Append-only record of conversations between characters.
use std::fmt;

use crate::error::ConversationError;
use crate::state::CharacterId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversationId(pub u32);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conversation #{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversationLine {
    pub speaker: CharacterId,
    pub text: String,
    /// Wall-clock milliseconds since the Unix epoch, stamped by the caller.
    pub timestamp_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conversation {
    pub id: ConversationId,
    /// Initiator first.
    pub participants: [CharacterId; 2],
    pub lines: Vec<ConversationLine>,
}

impl Conversation {
    pub fn involves(&self, character: CharacterId) -> bool {
        self.participants.contains(&character)
    }

    /// The participant that is not `speaker`.
    pub fn partner_of(&self, speaker: CharacterId) -> Option<CharacterId> {
        match self.participants {
            [a, b] if a == speaker => Some(b),
            [a, b] if b == speaker => Some(a),
            _ => None,
        }
    }
}

/// All conversations held so far, in the order they started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    next_id: u32,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new conversation; it becomes the latest one.
    pub fn begin(&mut self, initiator: CharacterId, partner: CharacterId) -> ConversationId {
        let id = ConversationId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.conversations.push(Conversation {
            id,
            participants: [initiator, partner],
            lines: Vec::new(),
        });
        id
    }

    pub fn append(
        &mut self,
        conversation: ConversationId,
        speaker: CharacterId,
        text: impl Into<String>,
        timestamp_ms: i64,
    ) -> Result<(), ConversationError> {
        let record = self
            .conversations
            .iter_mut()
            .rev()
            .find(|record| record.id == conversation)
            .ok_or(ConversationError::UnknownConversation(conversation.0))?;

        if !record.involves(speaker) {
            return Err(ConversationError::NotAParticipant {
                conversation: conversation.0,
                speaker,
            });
        }

        record.lines.push(ConversationLine {
            speaker,
            text: text.into(),
            timestamp_ms,
        });
        Ok(())
    }

    pub fn get(&self, conversation: ConversationId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .rev()
            .find(|record| record.id == conversation)
    }

    pub fn latest(&self) -> Option<&Conversation> {
        self.conversations.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_follows_most_recent_begin() {
        let mut store = ConversationStore::new();
        let first = store.begin(CharacterId(1), CharacterId(2));
        let second = store.begin(CharacterId(3), CharacterId(1));

        assert_ne!(first, second);
        assert_eq!(store.latest().map(|c| c.id), Some(second));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn lines_are_appended_in_order() {
        let mut store = ConversationStore::new();
        let id = store.begin(CharacterId(1), CharacterId(2));
        store.append(id, CharacterId(1), "Morning!", 10).unwrap();
        store.append(id, CharacterId(2), "Hi there.", 20).unwrap();

        let record = store.get(id).unwrap();
        let speakers: Vec<_> = record.lines.iter().map(|l| l.speaker).collect();
        assert_eq!(speakers, vec![CharacterId(1), CharacterId(2)]);
        assert_eq!(record.partner_of(CharacterId(2)), Some(CharacterId(1)));
    }

    #[test]
    fn outsiders_and_unknown_conversations_are_rejected() {
        let mut store = ConversationStore::new();
        let id = store.begin(CharacterId(1), CharacterId(2));

        assert_eq!(
            store.append(id, CharacterId(7), "psst", 0),
            Err(ConversationError::NotAParticipant {
                conversation: id.0,
                speaker: CharacterId(7),
            })
        );
        assert_eq!(
            store.append(ConversationId(99), CharacterId(1), "hello?", 0),
            Err(ConversationError::UnknownConversation(99))
        );
        assert!(store.get(id).unwrap().lines.is_empty());
    }
}
