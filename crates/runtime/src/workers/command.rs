//! Command worker that serves [`RuntimeHandle`](crate::RuntimeHandle) requests.
//!
//! Queue edits and queries are answered inline. Generation and execution
//! rounds run as separate tasks so that `clear_queue` keeps working while a
//! round is executing; the shared in-flight flag still rejects overlapping
//! rounds.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use game_core::{ActionQueueEntry, Character, CharacterId, World};

use crate::api::Result;
use crate::events::Notice;
use crate::scheduler::{ExecutionReport, RoundSummary, Scheduler};

/// Commands that can be sent to the command worker
pub enum Command {
    Enqueue {
        character: CharacterId,
        entry: ActionQueueEntry,
        reply: oneshot::Sender<Result<()>>,
    },
    ClearQueue {
        character: CharacterId,
        reply: oneshot::Sender<Result<()>>,
    },
    ClearAll {
        reply: oneshot::Sender<()>,
    },
    GenerateRound {
        reply: oneshot::Sender<Result<RoundSummary>>,
    },
    ExecuteRound {
        reply: oneshot::Sender<Result<ExecutionReport>>,
    },
    /// `None` toggles the current state.
    SetAutoRun {
        enabled: Option<bool>,
        reply: oneshot::Sender<bool>,
    },
    RemoveCharacter {
        character: CharacterId,
        reply: oneshot::Sender<Option<Character>>,
    },
    /// Query a snapshot of the world (read-only).
    QueryWorld {
        reply: oneshot::Sender<World>,
    },
    QueryActivity {
        reply: oneshot::Sender<Vec<Notice>>,
    },
}

/// Background task that processes handle commands.
pub struct CommandWorker {
    scheduler: Arc<Scheduler>,
    command_rx: mpsc::Receiver<Command>,
    auto_run: watch::Sender<bool>,
    shutdown: CancellationToken,
    rounds: JoinSet<()>,
}

impl CommandWorker {
    pub fn new(
        scheduler: Arc<Scheduler>,
        command_rx: mpsc::Receiver<Command>,
        auto_run: watch::Sender<bool>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            scheduler,
            command_rx,
            auto_run,
            shutdown,
            rounds: JoinSet::new(),
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                Some(joined) = self.rounds.join_next(), if !self.rounds.is_empty() => {
                    if let Err(err) = joined {
                        warn!(
                            target: "runtime::worker",
                            error = %err,
                            "round task ended abnormally"
                        );
                    }
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
            }
        }

        self.rounds.shutdown().await;
        info!(target: "runtime::worker", "command worker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Enqueue {
                character,
                entry,
                reply,
            } => {
                let result = self.scheduler.enqueue(character, entry).await;
                if reply.send(result).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "Enqueue reply channel closed (caller dropped)"
                    );
                }
            }
            Command::ClearQueue { character, reply } => {
                let result = self.scheduler.clear_queue(character).await;
                if reply.send(result).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "ClearQueue reply channel closed (caller dropped)"
                    );
                }
            }
            Command::ClearAll { reply } => {
                self.scheduler.clear_all_queues().await;
                let _ = reply.send(());
            }
            Command::GenerateRound { reply } => {
                let scheduler = Arc::clone(&self.scheduler);
                let shutdown = self.shutdown.clone();
                self.rounds.spawn(async move {
                    tokio::select! {
                        _ = shutdown.cancelled() => {}
                        result = scheduler.generate_round() => {
                            let _ = reply.send(result);
                        }
                    }
                });
            }
            Command::ExecuteRound { reply } => {
                let scheduler = Arc::clone(&self.scheduler);
                let shutdown = self.shutdown.clone();
                self.rounds.spawn(async move {
                    tokio::select! {
                        _ = shutdown.cancelled() => {}
                        result = scheduler.execute_round() => {
                            let _ = reply.send(result);
                        }
                    }
                });
            }
            Command::SetAutoRun { enabled, reply } => {
                let mut now = false;
                self.auto_run.send_modify(|running| {
                    *running = enabled.unwrap_or(!*running);
                    now = *running;
                });
                info!(target: "runtime::worker", enabled = now, "auto-run toggled");
                let notice = if now {
                    Notice::info("Auto-run enabled")
                } else {
                    Notice::info("Auto-run disabled")
                };
                self.scheduler.notify(notice).await;
                let _ = reply.send(now);
            }
            Command::RemoveCharacter { character, reply } => {
                let removed = self.scheduler.remove_character(character).await;
                if removed.is_some() {
                    info!(target: "runtime::worker", character = %character, "character removed");
                }
                let _ = reply.send(removed);
            }
            Command::QueryWorld { reply } => {
                let snapshot = self.scheduler.world().lock().await.clone();
                if reply.send(snapshot).is_err() {
                    debug!(
                        target: "runtime::worker",
                        "QueryWorld reply channel closed (caller dropped)"
                    );
                }
            }
            Command::QueryActivity { reply } => {
                let _ = reply.send(self.scheduler.activity_log().await);
            }
        }
    }
}
