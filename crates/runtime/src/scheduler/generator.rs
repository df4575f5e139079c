//! Round generation: one provider call per character, all-or-nothing commit.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use game_core::{ActionQueueEntry, CharacterId, RoundPlan, TalkConflict, World};

use super::guard::InFlightGuard;
use super::{Scheduler, display_name};
use crate::api::providers::ACTIONS_PER_ROUND;
use crate::api::{ActionRequest, CharacterBrief, PeerBrief, ProposedAction, Result, RuntimeError};
use crate::events::Notice;

/// What a successful generation round committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Characters that received a full round.
    pub characters: usize,
    /// Talk entries rewritten because their target was already claimed.
    pub conflicts: Vec<TalkConflict>,
}

impl Scheduler {
    /// Asks the action provider for every character's next round and commits
    /// it to the queues.
    ///
    /// Provider calls run concurrently; results are combined only once all of
    /// them have returned. Any failure discards the whole round.
    pub async fn generate_round(self: &Arc<Self>) -> Result<RoundSummary> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Err(RuntimeError::RoundInFlight);
        };

        match self.try_generate_round().await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                self.notify(Notice::error(format!("Action generation failed: {err}")))
                    .await;
                Err(err)
            }
        }
    }

    async fn try_generate_round(self: &Arc<Self>) -> Result<RoundSummary> {
        let requests = {
            let world = self.world.lock().await;
            build_requests(&world)
        };
        info!(
            target: "runtime::generator",
            characters = requests.len(),
            "requesting actions"
        );

        let mut calls = JoinSet::new();
        let mut owners = HashMap::new();
        for request in requests {
            let provider = Arc::clone(&self.action_provider);
            let character = request.character.id;
            let handle = calls.spawn(async move {
                let response = provider.propose_actions(&request).await;
                (character, response)
            });
            owners.insert(handle.id(), character);
        }

        let mut responses = BTreeMap::new();
        let mut failures = BTreeMap::new();
        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok((character, Ok(actions))) => {
                    responses.insert(character, actions);
                }
                Ok((character, Err(err))) => {
                    warn!(
                        target: "runtime::generator",
                        character = %character,
                        error = %err,
                        "action provider failed"
                    );
                    failures.insert(character, err.to_string());
                }
                Err(join_err) => {
                    let character = owners.get(&join_err.id()).copied().unwrap_or_default();
                    warn!(
                        target: "runtime::generator",
                        character = %character,
                        error = %join_err,
                        "action provider task aborted"
                    );
                    failures.insert(character, join_err.to_string());
                }
            }
        }

        if let Some((character, reason)) = failures.into_iter().next() {
            return Err(RuntimeError::GenerationIncomplete { character, reason });
        }

        let mut plan = {
            let world = self.world.lock().await;
            plan_round(&world, responses)?
        };

        let conflicts = {
            let mut rng = self.rng.lock().await;
            plan.resolve_talk_conflicts(&mut *rng)
        };

        let mut world = self.world.lock().await;
        world.queues_mut().append_round(&plan)?;
        self.publish_queues(&world);
        let notices: Vec<_> = conflicts
            .iter()
            .map(|conflict| conflict_notice(&world, conflict))
            .collect();
        drop(world);

        for notice in notices {
            self.notify(notice).await;
        }

        info!(
            target: "runtime::generator",
            characters = plan.len(),
            conflicts = conflicts.len(),
            "round committed"
        );
        Ok(RoundSummary {
            characters: plan.len(),
            conflicts,
        })
    }
}

fn build_requests(world: &World) -> Vec<ActionRequest> {
    let waypoints: Vec<String> = world
        .map()
        .list_waypoints()
        .into_iter()
        .map(str::to_string)
        .collect();

    world
        .characters()
        .map(|character| ActionRequest {
            character: CharacterBrief::from(character),
            peers: world
                .characters()
                .filter(|peer| peer.id != character.id)
                .map(PeerBrief::from)
                .collect(),
            waypoints: waypoints.clone(),
            animations: character.clips().map(str::to_string).collect(),
        })
        .collect()
}

/// Validates every response and converts it into queue entries.
fn plan_round(
    world: &World,
    responses: BTreeMap<CharacterId, Vec<ProposedAction>>,
) -> Result<RoundPlan> {
    let mut plan = RoundPlan::new();
    for (character, actions) in responses {
        if actions.len() != ACTIONS_PER_ROUND {
            return Err(RuntimeError::GenerationIncomplete {
                character,
                reason: format!(
                    "expected {ACTIONS_PER_ROUND} actions, got {}",
                    actions.len()
                ),
            });
        }

        let entries = actions
            .into_iter()
            .map(|action| to_entry(world, character, action))
            .collect::<std::result::Result<Vec<_>, String>>()
            .map_err(|reason| RuntimeError::GenerationIncomplete { character, reason })?;

        debug!(
            target: "runtime::generator",
            character = %character,
            entries = ?entries,
            "response accepted"
        );
        plan.insert(character, entries);
    }
    Ok(plan)
}

fn to_entry(
    world: &World,
    character: CharacterId,
    action: ProposedAction,
) -> std::result::Result<ActionQueueEntry, String> {
    match action {
        ProposedAction::Goto { checkpoint } => {
            let checkpoint = checkpoint.trim();
            if checkpoint.is_empty() {
                return Err("goto without a checkpoint".to_string());
            }
            Ok(ActionQueueEntry::goto(checkpoint))
        }
        ProposedAction::Animation { animation } => {
            let animation = animation.trim();
            if animation.is_empty() {
                return Err("animation without a name".to_string());
            }
            Ok(ActionQueueEntry::animation(animation))
        }
        ProposedAction::TalkTo { target_name } => {
            let target = world
                .find_by_name(&target_name)
                .ok_or_else(|| format!("unknown talk target '{target_name}'"))?;
            if target.id == character {
                return Err("a character cannot talk to itself".to_string());
            }
            Ok(ActionQueueEntry::talk_to(target.id))
        }
        ProposedAction::Wander => Ok(ActionQueueEntry::Wander),
    }
}

fn conflict_notice(world: &World, conflict: &TalkConflict) -> Notice {
    Notice::warning(format!(
        "{} wanted to talk to {}, but {} already will; {} plays {} instead",
        display_name(world, conflict.character),
        display_name(world, conflict.target),
        display_name(world, conflict.claimed_by),
        display_name(world, conflict.character),
        conflict.replacement,
    ))
}
