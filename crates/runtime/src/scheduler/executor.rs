//! Lockstep execution: step `i` of every queue runs concurrently, and step
//! `i + 1` starts only after all of them finished.
//!
//! The round runs from a snapshot taken when the queues pass validation, so
//! queue edits made mid-round never shift entries between steps. An entry is
//! skipped (and reported cancelled) once its own queue or, for a talk entry,
//! its partner's queue has been cleared since the snapshot.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use game_core::{ActionQueueEntry, ActionQueues, CharacterId};

use super::Scheduler;
use super::guard::InFlightGuard;
use crate::api::{Result, RuntimeError};
use crate::events::{EntryOutcome, Event, ExecutionEvent, ExecutorPhase, Notice};

/// Tally of one execution round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub steps: usize,
    /// Committed entries accounted for, whatever their outcome.
    pub entries: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub timed_out: usize,
}

impl ExecutionReport {
    fn record(&mut self, outcome: &EntryOutcome) {
        self.entries += 1;
        match outcome {
            EntryOutcome::Completed => {}
            EntryOutcome::Cancelled => self.cancelled += 1,
            EntryOutcome::TimedOut => self.timed_out += 1,
            EntryOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Entries committed at validation time, with the queue epochs they belong to.
struct RoundSnapshot {
    epochs: BTreeMap<CharacterId, u64>,
    queues: BTreeMap<CharacterId, Vec<ActionQueueEntry>>,
}

impl RoundSnapshot {
    fn capture(queues: &ActionQueues) -> Self {
        let mut snapshot = Self {
            epochs: BTreeMap::new(),
            queues: BTreeMap::new(),
        };
        for (character, queue) in queues.iter() {
            snapshot.epochs.insert(character, queue.epoch());
            if !queue.is_empty() {
                snapshot.queues.insert(character, queue.entries().to_vec());
            }
        }
        snapshot
    }

    fn entries_at(&self, step: usize) -> impl Iterator<Item = (CharacterId, &ActionQueueEntry)> {
        self.queues
            .iter()
            .filter_map(move |(character, entries)| entries.get(step).map(|e| (*character, e)))
    }

    fn unchanged(&self, queues: &ActionQueues, character: CharacterId) -> bool {
        queues.epoch(character) == self.epochs.get(&character).copied()
    }

    /// Epoch to run `entry` under, or `None` once a clear has dropped it.
    fn committed_epoch(
        &self,
        queues: &ActionQueues,
        character: CharacterId,
        entry: &ActionQueueEntry,
    ) -> Option<u64> {
        if !self.unchanged(queues, character) {
            return None;
        }
        if let ActionQueueEntry::TalkTo { target, .. } = entry
            && !self.unchanged(queues, *target)
        {
            return None;
        }
        self.epochs.get(&character).copied()
    }
}

impl Scheduler {
    /// Runs `Idle -> Validating -> Executing(step)* -> Draining -> Idle`.
    pub async fn execute_round(self: &Arc<Self>) -> Result<ExecutionReport> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Err(RuntimeError::RoundInFlight);
        };

        self.set_phase(ExecutorPhase::Validating);
        let (validated, snapshot) = {
            let world = self.world.lock().await;
            let queues = world.queues();
            (queues.validate_lockstep(), RoundSnapshot::capture(queues))
        };
        let steps = match validated {
            Ok(steps) => steps,
            Err(err) => {
                self.set_phase(ExecutorPhase::Idle);
                self.notify(Notice::error(format!("Cannot execute queues: {err}")))
                    .await;
                return Err(err.into());
            }
        };

        if steps == 0 {
            self.set_phase(ExecutorPhase::Idle);
            self.notify(Notice::info("No actions queued")).await;
            return Ok(ExecutionReport::default());
        }

        info!(target: "runtime::executor", steps, "executing queues");
        let mut report = ExecutionReport {
            steps,
            ..ExecutionReport::default()
        };
        for step in 0..steps {
            self.set_phase(ExecutorPhase::Executing { step });
            self.run_step(step, &snapshot, &mut report).await;
        }

        self.set_phase(ExecutorPhase::Draining);
        {
            let mut world = self.world.lock().await;
            world.queues_mut().clear_all();
            self.publish_queues(&world);
        }
        self.bus
            .publish(Event::Execution(ExecutionEvent::RoundCompleted { steps }));
        self.notify(
            Notice::info("All actions completed").displayed_for(self.config.completion_notice_ms),
        )
        .await;
        self.set_phase(ExecutorPhase::Idle);

        info!(
            target: "runtime::executor",
            steps,
            entries = report.entries,
            failed = report.failed,
            cancelled = report.cancelled,
            timed_out = report.timed_out,
            "round finished"
        );
        Ok(report)
    }

    /// Fans out every entry at `step` and waits for all of them.
    async fn run_step(
        self: &Arc<Self>,
        step: usize,
        snapshot: &RoundSnapshot,
        report: &mut ExecutionReport,
    ) {
        let mut batch = Vec::new();
        let mut dropped = Vec::new();
        {
            let world = self.world.lock().await;
            for (character, entry) in snapshot.entries_at(step) {
                match snapshot.committed_epoch(world.queues(), character, entry) {
                    Some(epoch) => batch.push((character, entry.clone(), epoch)),
                    None => dropped.push(character),
                }
            }
        }
        debug!(
            target: "runtime::executor",
            step,
            entries = batch.len(),
            dropped = dropped.len(),
            "step started"
        );

        for character in dropped {
            debug!(
                target: "runtime::executor",
                character = %character,
                step,
                "entry dropped by a queue clear"
            );
            self.bus
                .publish(Event::Execution(ExecutionEvent::EntryFinished {
                    character,
                    step,
                    outcome: EntryOutcome::Cancelled,
                }));
            report.record(&EntryOutcome::Cancelled);
        }

        let mut tasks = JoinSet::new();
        let mut owners = HashMap::new();
        for (character, entry, epoch) in batch {
            let scheduler = Arc::clone(self);
            let handle = tasks.spawn(async move {
                scheduler.run_entry(character, step, entry, epoch).await
            });
            owners.insert(handle.id(), character);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(&outcome),
                Err(join_err) => {
                    // A panicking entry still counts as finished for the barrier.
                    let outcome = EntryOutcome::Failed {
                        error: join_err.to_string(),
                    };
                    if let Some(character) = owners.get(&join_err.id()).copied() {
                        error!(
                            target: "runtime::executor",
                            character = %character,
                            step,
                            error = %join_err,
                            "entry task aborted"
                        );
                        self.bus
                            .publish(Event::Execution(ExecutionEvent::EntryFinished {
                                character,
                                step,
                                outcome: outcome.clone(),
                            }));
                    }
                    report.record(&outcome);
                }
            }
        }
        debug!(target: "runtime::executor", step, "step joined");
    }
}
