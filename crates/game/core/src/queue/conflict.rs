use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use rand::Rng;
use strum::VariantArray;

use super::ActionQueueEntry;
use crate::state::{CharacterId, Emote};

/// A generated round: proposed entries per character, before commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundPlan {
    plans: BTreeMap<CharacterId, Vec<ActionQueueEntry>>,
}

/// A `TalkTo` that lost its target to an earlier initiator and was rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TalkConflict {
    /// Character whose entry was rewritten.
    pub character: CharacterId,
    pub slot: usize,
    /// The contested conversation target.
    pub target: CharacterId,
    /// The initiator that keeps the target.
    pub claimed_by: CharacterId,
    pub claimed_slot: usize,
    pub replacement: Emote,
}

impl RoundPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: CharacterId, entries: Vec<ActionQueueEntry>) {
        self.plans.insert(character, entries);
    }

    pub fn get(&self, character: CharacterId) -> Option<&[ActionQueueEntry]> {
        self.plans.get(&character).map(Vec::as_slice)
    }

    /// Plans in ascending character id order.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &[ActionQueueEntry])> {
        self.plans.iter().map(|(id, entries)| (*id, entries.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Enforces "one initiator per conversation target" across the round.
    ///
    /// Characters are scanned in id order and slots in order. The first
    /// initiator naming a target claims it; every later `TalkTo` naming the
    /// same target becomes an `Animation` with a random [`Emote`]. Running
    /// this again on its own output changes nothing.
    pub fn resolve_talk_conflicts<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<TalkConflict> {
        let mut claims: BTreeMap<CharacterId, (CharacterId, usize)> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for (character, entries) in self.plans.iter_mut() {
            for (slot, entry) in entries.iter_mut().enumerate() {
                let Some(target) = entry.initiated_talk_target() else {
                    continue;
                };

                match claims.entry(target) {
                    Entry::Vacant(vacant) => {
                        vacant.insert((*character, slot));
                    }
                    Entry::Occupied(occupied) => {
                        let (claimed_by, claimed_slot) = *occupied.get();
                        let replacement = Emote::VARIANTS[rng.gen_range(0..Emote::VARIANTS.len())];
                        *entry = ActionQueueEntry::animation(replacement.clip());
                        conflicts.push(TalkConflict {
                            character: *character,
                            slot,
                            target,
                            claimed_by,
                            claimed_slot,
                            replacement,
                        });
                    }
                }
            }
        }

        conflicts
    }
}
