//! Per-character action queues and round planning.
//!
//! Every character owns one [`CharacterQueue`] holding at most
//! [`QUEUE_CAPACITY`] entries. Queues are created empty when a character is
//! spawned, filled a whole round at a time, drained by the executor and then
//! recycled rather than dropped.
//!
//! Each queue also carries an `epoch` counter. Clearing a queue bumps it, which
//! is how an in-flight action notices at its next poll that it was cancelled.
mod conflict;
mod entry;

pub use conflict::{RoundPlan, TalkConflict};
pub use entry::ActionQueueEntry;

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::error::QueueError;
use crate::state::CharacterId;

/// Maximum number of pending entries per character, and the round length.
pub const QUEUE_CAPACITY: usize = 3;

/// Ordered pending entries of a single character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterQueue {
    entries: ArrayVec<ActionQueueEntry, QUEUE_CAPACITY>,
    epoch: u64,
}

impl CharacterQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.entries.remaining_capacity()
    }

    pub fn get(&self, index: usize) -> Option<&ActionQueueEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ActionQueueEntry] {
        &self.entries
    }

    /// Cancellation counter; changes every time the queue is cleared.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// All queues, keyed and iterated in character id order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionQueues {
    queues: BTreeMap<CharacterId, CharacterQueue>,
}

impl ActionQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue for `character` (no-op if one exists).
    pub fn register(&mut self, character: CharacterId) {
        self.queues.entry(character).or_default();
    }

    /// Removes the queue of a departed character along with every talk entry
    /// that still points at it.
    pub fn unregister(&mut self, character: CharacterId) -> Vec<CharacterId> {
        self.queues.remove(&character);
        self.remove_talk_targets(character)
    }

    pub fn contains(&self, character: CharacterId) -> bool {
        self.queues.contains_key(&character)
    }

    pub fn get(&self, character: CharacterId) -> Option<&CharacterQueue> {
        self.queues.get(&character)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &CharacterQueue)> {
        self.queues.iter().map(|(id, queue)| (*id, queue))
    }

    pub fn epoch(&self, character: CharacterId) -> Option<u64> {
        self.queues.get(&character).map(CharacterQueue::epoch)
    }

    /// Appends one entry, leaving the queue untouched when it is full.
    pub fn append(
        &mut self,
        character: CharacterId,
        entry: ActionQueueEntry,
    ) -> Result<(), QueueError> {
        let queue = self
            .queues
            .get_mut(&character)
            .ok_or(QueueError::UnknownCharacter(character))?;

        queue
            .entries
            .try_push(entry)
            .map_err(|_| QueueError::QueueFull {
                character,
                capacity: QUEUE_CAPACITY,
            })
    }

    /// Appends a whole round atomically.
    ///
    /// Every target queue is checked for room before anything is written, so
    /// on error no queue has changed.
    pub fn append_round(&mut self, plan: &RoundPlan) -> Result<(), QueueError> {
        for (character, entries) in plan.iter() {
            let queue = self
                .queues
                .get(&character)
                .ok_or(QueueError::UnknownCharacter(character))?;
            if queue.remaining_capacity() < entries.len() {
                return Err(QueueError::QueueFull {
                    character,
                    capacity: QUEUE_CAPACITY,
                });
            }
        }

        for (character, entries) in plan.iter() {
            if let Some(queue) = self.queues.get_mut(&character) {
                queue.entries.extend(entries.iter().cloned());
            }
        }
        Ok(())
    }

    /// Empties `character`'s queue and drops every talk entry elsewhere that
    /// targets it.
    ///
    /// Returns the other characters whose queues lost an entry.
    pub fn clear(&mut self, character: CharacterId) -> Result<Vec<CharacterId>, QueueError> {
        self.queues
            .get_mut(&character)
            .ok_or(QueueError::UnknownCharacter(character))?
            .clear();
        Ok(self.remove_talk_targets(character))
    }

    /// Empties every queue.
    pub fn clear_all(&mut self) {
        for queue in self.queues.values_mut() {
            queue.clear();
        }
    }

    fn remove_talk_targets(&mut self, character: CharacterId) -> Vec<CharacterId> {
        let mut touched = Vec::new();
        for (id, queue) in self.queues.iter_mut() {
            let before = queue.entries.len();
            queue.entries.retain(|entry| !entry.targets(character));
            if queue.entries.len() != before {
                touched.push(*id);
            }
        }
        touched
    }

    pub fn all_empty(&self) -> bool {
        self.queues.values().all(CharacterQueue::is_empty)
    }

    /// Length of the longest queue.
    pub fn max_len(&self) -> usize {
        self.queues.values().map(CharacterQueue::len).max().unwrap_or(0)
    }

    /// Lockstep gate: every non-empty queue has the same length.
    pub fn all_same_length_or_empty(&self) -> bool {
        let mut lengths = self
            .queues
            .values()
            .map(CharacterQueue::len)
            .filter(|len| *len > 0);
        match lengths.next() {
            Some(first) => lengths.all(|len| len == first),
            None => true,
        }
    }

    /// Checks the lockstep gate and returns the common step count.
    pub fn validate_lockstep(&self) -> Result<usize, QueueError> {
        if self.all_same_length_or_empty() {
            return Ok(self.max_len());
        }
        Err(QueueError::LengthMismatch {
            lengths: self
                .queues
                .iter()
                .filter(|(_, queue)| !queue.is_empty())
                .map(|(id, queue)| (*id, queue.len()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queues(ids: &[u32]) -> ActionQueues {
        let mut queues = ActionQueues::new();
        for id in ids {
            queues.register(CharacterId(*id));
        }
        queues
    }

    #[test]
    fn fourth_append_is_rejected_without_change() {
        let mut queues = queues(&[1]);
        let monet = CharacterId(1);
        for waypoint in ["cafe", "park", "studio"] {
            queues.append(monet, ActionQueueEntry::goto(waypoint)).unwrap();
        }
        let before = queues.clone();

        let err = queues.append(monet, ActionQueueEntry::Wander).unwrap_err();

        assert_eq!(
            err,
            QueueError::QueueFull {
                character: monet,
                capacity: QUEUE_CAPACITY
            }
        );
        assert_eq!(queues, before);
        assert_eq!(queues.get(monet).unwrap().len(), QUEUE_CAPACITY);
    }

    #[test]
    fn append_to_unknown_character_fails() {
        let mut queues = queues(&[1]);
        assert_eq!(
            queues.append(CharacterId(9), ActionQueueEntry::Wander),
            Err(QueueError::UnknownCharacter(CharacterId(9)))
        );
    }

    #[test]
    fn clear_removes_dangling_talk_targets() {
        let mut queues = queues(&[1, 2, 3]);
        let (a, b, c) = (CharacterId(1), CharacterId(2), CharacterId(3));
        queues.append(a, ActionQueueEntry::talk_to(c)).unwrap();
        queues.append(a, ActionQueueEntry::Wander).unwrap();
        queues.append(b, ActionQueueEntry::goto("cafe")).unwrap();
        queues.append(c, ActionQueueEntry::Wander).unwrap();
        let epoch = queues.epoch(c).unwrap();

        let touched = queues.clear(c).unwrap();

        assert_eq!(touched, vec![a]);
        assert!(queues.get(c).unwrap().is_empty());
        assert_eq!(queues.get(a).unwrap().entries(), &[ActionQueueEntry::Wander]);
        assert_eq!(queues.get(b).unwrap().len(), 1);
        assert_ne!(queues.epoch(c).unwrap(), epoch);
        assert_eq!(queues.epoch(b).unwrap(), 0);
    }

    #[test]
    fn lockstep_gate_requires_equal_non_empty_lengths() {
        let mut queues = queues(&[1, 2, 3]);
        assert!(queues.all_same_length_or_empty());
        assert_eq!(queues.validate_lockstep(), Ok(0));

        queues.append(CharacterId(1), ActionQueueEntry::Wander).unwrap();
        queues.append(CharacterId(1), ActionQueueEntry::Wander).unwrap();
        queues.append(CharacterId(2), ActionQueueEntry::Wander).unwrap();
        queues.append(CharacterId(2), ActionQueueEntry::Wander).unwrap();
        assert_eq!(queues.validate_lockstep(), Ok(2));

        queues.append(CharacterId(2), ActionQueueEntry::Wander).unwrap();
        assert!(!queues.all_same_length_or_empty());
        assert_eq!(
            queues.validate_lockstep(),
            Err(QueueError::LengthMismatch {
                lengths: vec![(CharacterId(1), 2), (CharacterId(2), 3)]
            })
        );
    }

    #[test]
    fn append_round_is_all_or_nothing() {
        let mut queues = queues(&[1, 2]);
        queues.append(CharacterId(2), ActionQueueEntry::Wander).unwrap();
        let before = queues.clone();

        let mut plan = RoundPlan::new();
        plan.insert(CharacterId(1), vec![ActionQueueEntry::Wander; 3]);
        plan.insert(CharacterId(2), vec![ActionQueueEntry::Wander; 3]);

        assert!(matches!(
            queues.append_round(&plan),
            Err(QueueError::QueueFull { character, .. }) if character == CharacterId(2)
        ));
        assert_eq!(queues, before);

        queues.clear_all();
        queues.append_round(&plan).unwrap();
        assert_eq!(queues.validate_lockstep(), Ok(3));
    }
}
