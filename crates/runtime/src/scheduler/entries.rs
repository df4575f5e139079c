//! Runners for individual queue entries.
//!
//! Every runner polls once per frame: it locks the world, checks whether its
//! queue was cleared (the queue epoch changed), advances the character and
//! releases the lock before the next tick. Errors are returned to
//! [`Scheduler::run_entry`], which logs them and reports the entry as failed
//! so the step barrier never waits on it.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval};
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use game_core::{
    ActionError, ActionQueueEntry, AnimationState, CharacterId, ConversationId, MovementSignal,
    World,
};

use super::Scheduler;
use crate::api::{CharacterBrief, DialogueProvider, DialogueRequest};
use crate::events::{ConversationEvent, EntryOutcome, Event, ExecutionEvent};

type EntryResult = Result<EntryOutcome, ActionError>;

/// Fails for a departed character, otherwise reports whether its queue was
/// cleared since `epoch` was captured.
fn cancelled(world: &World, character: CharacterId, epoch: u64) -> Result<bool, ActionError> {
    if world.character(character).is_none() {
        return Err(ActionError::StaleCharacter(character));
    }
    Ok(world.queues().epoch(character) != Some(epoch))
}

fn face(world: &mut World, character: CharacterId, toward: CharacterId) {
    let Some(target) = world.character(toward).map(|c| c.position) else {
        return;
    };
    if let Some(actor) = world.character_mut(character) {
        let offset = target - actor.position;
        if offset.length_squared() > f32::EPSILON {
            actor.heading = offset.heading();
        }
    }
}

impl Scheduler {
    pub(super) async fn run_entry(
        self: Arc<Self>,
        character: CharacterId,
        step: usize,
        entry: ActionQueueEntry,
        epoch: u64,
    ) -> EntryOutcome {
        self.bus
            .publish(Event::Execution(ExecutionEvent::EntryStarted {
                character,
                step,
                entry: entry.clone(),
            }));
        debug!(
            target: "runtime::executor",
            character = %character,
            step,
            entry = %entry,
            "entry started"
        );

        let result = match &entry {
            ActionQueueEntry::Goto { waypoint } => self.run_goto(character, waypoint, epoch).await,
            ActionQueueEntry::Animation { name } => {
                self.run_animation(character, name, epoch).await
            }
            ActionQueueEntry::TalkTo {
                target,
                is_initiator: true,
            } => self.run_talk(character, *target, epoch).await,
            ActionQueueEntry::TalkTo { target, .. } => {
                self.run_listen(character, *target, epoch).await
            }
            ActionQueueEntry::Wander => self.run_wander(character, epoch).await,
        };

        let outcome = result.unwrap_or_else(|err| {
            warn!(
                target: "runtime::executor",
                character = %character,
                step,
                entry = %entry,
                error = %err,
                "entry failed; counting it as complete"
            );
            EntryOutcome::Failed {
                error: err.to_string(),
            }
        });

        self.bus
            .publish(Event::Execution(ExecutionEvent::EntryFinished {
                character,
                step,
                outcome: outcome.clone(),
            }));
        outcome
    }

    fn frames(&self) -> Interval {
        let mut frames = interval(self.config.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        frames
    }

    async fn sample_talk_duration(&self) -> Duration {
        let (min, max) = self.config.talk_bounds_ms();
        let millis = self.rng.lock().await.gen_range(min..=max);
        Duration::from_millis(millis)
    }

    async fn run_goto(&self, character: CharacterId, waypoint: &str, epoch: u64) -> EntryResult {
        self.world.lock().await.start_goto(character, waypoint)?;

        let deadline = Instant::now() + self.config.goto_timeout();
        let dt = self.config.frame_dt();
        let mut frames = self.frames();
        loop {
            frames.tick().await;
            let mut world = self.world.lock().await;
            if cancelled(&world, character, epoch)? {
                world.release_movement(character);
                return Ok(EntryOutcome::Cancelled);
            }

            let tick = {
                let mut rng = self.rng.lock().await;
                world.advance_movement(character, dt, &mut *rng)?
            };
            if tick.finished {
                return Ok(EntryOutcome::Completed);
            }

            if Instant::now() >= deadline {
                world.release_movement(character);
                warn!(
                    target: "runtime::executor",
                    character = %character,
                    waypoint,
                    "goto timed out before arriving"
                );
                return Ok(EntryOutcome::TimedOut);
            }
        }
    }

    async fn run_wander(&self, character: CharacterId, epoch: u64) -> EntryResult {
        {
            let mut world = self.world.lock().await;
            let mut rng = self.rng.lock().await;
            world.start_wander(character, &mut *rng)?;
        }

        let deadline = Instant::now() + self.config.wander();
        let dt = self.config.frame_dt();
        let mut frames = self.frames();
        loop {
            frames.tick().await;
            let mut world = self.world.lock().await;
            if cancelled(&world, character, epoch)? {
                world.release_movement(character);
                return Ok(EntryOutcome::Cancelled);
            }
            if Instant::now() >= deadline {
                world.release_movement(character);
                return Ok(EntryOutcome::Completed);
            }

            let mut rng = self.rng.lock().await;
            world.advance_movement(character, dt, &mut *rng)?;
        }
    }

    async fn run_animation(&self, character: CharacterId, name: &str, epoch: u64) -> EntryResult {
        {
            let mut world = self.world.lock().await;
            world.release_movement(character);
            world.play(character, AnimationState::Expressive(name.to_string()))?;
        }
        self.hold(character, epoch, self.config.animation()).await
    }

    /// Passive side of a manual conversation: stay in place playing Talking.
    async fn run_listen(
        &self,
        character: CharacterId,
        partner: CharacterId,
        epoch: u64,
    ) -> EntryResult {
        let duration = self.sample_talk_duration().await;
        {
            let mut world = self.world.lock().await;
            world.release_movement(character);
            world.play(character, AnimationState::Talking)?;
            face(&mut world, character, partner);
        }
        self.hold(character, epoch, duration).await
    }

    /// Keeps the current pose until `duration` elapses, then stands.
    async fn hold(&self, character: CharacterId, epoch: u64, duration: Duration) -> EntryResult {
        let deadline = Instant::now() + duration;
        let mut frames = self.frames();
        loop {
            frames.tick().await;
            let mut world = self.world.lock().await;
            if cancelled(&world, character, epoch)? {
                world.stand(character)?;
                return Ok(EntryOutcome::Cancelled);
            }
            if Instant::now() >= deadline {
                world.stand(character)?;
                return Ok(EntryOutcome::Completed);
            }
        }
    }

    async fn run_talk(
        self: &Arc<Self>,
        character: CharacterId,
        partner: CharacterId,
        epoch: u64,
    ) -> EntryResult {
        let duration = self.sample_talk_duration().await;
        let partner_epoch = {
            let mut world = self.world.lock().await;
            world.start_talk(character, partner)?;
            world.queues().epoch(partner)
        };

        let mut conversation = None;
        let result = self
            .talk_loop(
                character,
                partner,
                (epoch, partner_epoch),
                Instant::now() + duration,
                &mut conversation,
            )
            .await;

        let Some((id, dialogue)) = conversation else {
            // Never engaged, so the partner was not pulled into anything.
            let mut world = self.world.lock().await;
            world.release_movement(character);
            if let Err(err) = world.stand(character) {
                debug!(
                    target: "runtime::executor",
                    character = %character,
                    error = %err,
                    "initiator left before standing"
                );
            }
            return result;
        };

        drop(dialogue);
        self.world.lock().await.end_conversation(character, partner);
        self.bus
            .publish(Event::Conversation(ConversationEvent::Ended { conversation: id }));
        info!(
            target: "runtime::executor",
            initiator = %character,
            partner = %partner,
            conversation = %id,
            "conversation ended"
        );
        result
    }

    async fn talk_loop(
        self: &Arc<Self>,
        character: CharacterId,
        partner: CharacterId,
        (epoch, partner_epoch): (u64, Option<u64>),
        deadline: Instant,
        conversation: &mut Option<(ConversationId, Option<AbortOnDropHandle<()>>)>,
    ) -> EntryResult {
        let dt = self.config.frame_dt();
        let mut frames = self.frames();
        loop {
            frames.tick().await;
            let mut world = self.world.lock().await;
            // Clearing either side's queue ends the conversation.
            let partner_cleared = world.queues().epoch(partner) != partner_epoch;
            if cancelled(&world, character, epoch)? || partner_cleared {
                return Ok(EntryOutcome::Cancelled);
            }
            if Instant::now() >= deadline {
                return Ok(EntryOutcome::Completed);
            }

            let tick = {
                let mut rng = self.rng.lock().await;
                world.advance_movement(character, dt, &mut *rng)?
            };
            for signal in tick.signals {
                let MovementSignal::ConversationStarted { initiator, partner } = signal;
                let id = world.conversations_mut().begin(initiator, partner);
                if let Err(err) = world.play(partner, AnimationState::Talking) {
                    debug!(
                        target: "runtime::executor",
                        partner = %partner,
                        error = %err,
                        "partner left; initiator talks alone"
                    );
                }
                face(&mut world, partner, initiator);

                self.bus
                    .publish(Event::Conversation(ConversationEvent::Started {
                        conversation: id,
                        initiator,
                        partner,
                    }));
                info!(
                    target: "runtime::executor",
                    initiator = %initiator,
                    partner = %partner,
                    conversation = %id,
                    "conversation started"
                );

                let dialogue = self.dialogue_provider.as_ref().map(|provider| {
                    AbortOnDropHandle::new(tokio::spawn(Arc::clone(self).run_dialogue(
                        Arc::clone(provider),
                        id,
                        initiator,
                        partner,
                    )))
                });
                *conversation = Some((id, dialogue));
            }
        }
    }

    /// Alternates lines between the two participants, initiator first.
    async fn run_dialogue(
        self: Arc<Self>,
        provider: Arc<dyn DialogueProvider>,
        conversation: ConversationId,
        initiator: CharacterId,
        partner: CharacterId,
    ) {
        for turn in 0..self.config.dialogue_turns {
            let (speaker, listener) = if turn % 2 == 0 {
                (initiator, partner)
            } else {
                (partner, initiator)
            };

            let request = {
                let world = self.world.lock().await;
                let (Some(speaker), Some(listener), Some(record)) = (
                    world.character(speaker),
                    world.character(listener),
                    world.conversations().get(conversation),
                ) else {
                    return;
                };
                DialogueRequest {
                    conversation,
                    speaker: CharacterBrief::from(speaker),
                    listener: CharacterBrief::from(listener),
                    history: record.lines.clone(),
                }
            };

            let text = match provider.next_line(&request).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(
                        target: "runtime::executor",
                        conversation = %conversation,
                        speaker = %speaker,
                        error = %err,
                        "dialogue provider failed; conversation continues silently"
                    );
                    return;
                }
            };

            let timestamp_ms = chrono::Utc::now().timestamp_millis();
            let appended = self.world.lock().await.conversations_mut().append(
                conversation,
                speaker,
                text.clone(),
                timestamp_ms,
            );
            if let Err(err) = appended {
                warn!(target: "runtime::executor", error = %err, "dropping dialogue line");
                return;
            }

            self.bus
                .publish(Event::Conversation(ConversationEvent::Line {
                    conversation,
                    line: game_core::ConversationLine {
                        speaker,
                        text,
                        timestamp_ms,
                    },
                }));
            tokio::time::sleep(self.config.dialogue_pause()).await;
        }
    }
}
