//! Auto-run loop: generate when every queue is empty, execute otherwise.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::scheduler::Scheduler;

/// Supervises the generate/execute cycle while the running flag is set.
///
/// The flag is read at iteration boundaries only, so switching it off lets
/// the current round finish. Shutdown abandons the round immediately.
pub struct AutoRunWorker {
    scheduler: Arc<Scheduler>,
    running: watch::Receiver<bool>,
    shutdown: CancellationToken,
}

impl AutoRunWorker {
    pub fn new(
        scheduler: Arc<Scheduler>,
        running: watch::Receiver<bool>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            scheduler,
            running,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let idle = self.scheduler.config().auto_run_idle();
        loop {
            if !*self.running.borrow_and_update() {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    changed = self.running.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = self.iterate() => {}
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(idle) => {}
            }
        }
        info!(target: "runtime::auto_run", "auto-run worker stopped");
    }

    async fn iterate(&self) {
        if self.scheduler.is_in_flight() {
            debug!(target: "runtime::auto_run", "round in flight; waiting");
            return;
        }

        let queues_empty = self.scheduler.world().lock().await.queues().all_empty();
        // Errors were already published as notices; the next iteration retries.
        if queues_empty {
            if let Err(err) = self.scheduler.generate_round().await {
                warn!(target: "runtime::auto_run", error = %err, "generation failed");
            }
        } else if let Err(err) = self.scheduler.execute_round().await {
            warn!(target: "runtime::auto_run", error = %err, "execution failed");
        }
    }
}
