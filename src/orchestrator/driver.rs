//! Tick loop with cancellation, and manual refresh

use super::Orchestrator;
use super::job::{JobPhase, JobSnapshot, TickOutcome};
use crate::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl Orchestrator {
    /// Drive the started submission until it completes, fails or is cancelled
    ///
    /// Sleeps between ticks through the configured [`Scheduler`](super::Scheduler).
    /// Cancellation is observed between ticks and during sleeps; it marks the
    /// job [`JobPhase::Failed`] with a `cancelled` error and leaves the
    /// uploaded file and the workflow run untouched.
    ///
    /// Returns immediately for a job that was never started. The driver is
    /// bound to the submission current when it is called: once
    /// [`select_file`](Self::select_file) or [`start`](Self::start) replaces
    /// that submission, it returns without ticking or cancelling the new one.
    pub async fn run(&self, cancel: CancellationToken) -> JobSnapshot {
        let generation = self.job.lock().await.generation;
        loop {
            if cancel.is_cancelled() {
                self.cancel_job(generation).await;
                break;
            }

            let delay = match self.tick_generation(generation).await {
                TickOutcome::Done => break,
                TickOutcome::Wait(delay) => delay,
            };
            if delay.is_zero() {
                continue;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.cancel_job(generation).await;
                    break;
                }
                _ = self.scheduler.sleep(delay) => {}
            }
        }
        self.snapshot()
    }

    /// Check the monitored run's status right away
    ///
    /// Counts as one status check toward the attempt ceiling. Returns `None`
    /// when no run is being monitored.
    pub async fn refresh(&self) -> Option<TickOutcome> {
        let mut job = self.job.lock().await;
        if job.phase != JobPhase::Monitoring {
            debug!(phase = %job.phase, "refresh ignored outside monitoring");
            return None;
        }
        let outcome = self.monitor(&mut job).await;
        self.publish(&job);
        Some(outcome)
    }

    async fn cancel_job(&self, generation: u64) {
        let mut job = self.job.lock().await;
        if job.generation == generation && job.phase.is_active() {
            self.fail(&mut job, Error::Cancelled);
        }
    }
}
