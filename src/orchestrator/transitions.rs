//! The transition function and the per-phase actions it dispatches to

use super::Orchestrator;
use super::job::{Job, JobEvent, JobPhase, TickOutcome};
use crate::error::{Error, ErrorDetail};
use crate::types::{RunConclusion, RunId};
use std::time::Duration;
use tracing::{debug, error, info, warn};

impl Orchestrator {
    /// Perform the current phase's action and advance the job
    ///
    /// Returns how long the driver must wait before ticking again. Idle and
    /// terminal jobs return [`TickOutcome::Done`] without touching the backend.
    /// Errors never escape: they move the job to [`JobPhase::Failed`] and are
    /// recorded in the snapshot.
    pub async fn tick(&self) -> TickOutcome {
        let mut job = self.job.lock().await;
        self.step(&mut job).await
    }

    /// Tick only if the job still belongs to submission `generation`
    pub(super) async fn tick_generation(&self, generation: u64) -> TickOutcome {
        let mut job = self.job.lock().await;
        if job.generation != generation {
            debug!(
                generation,
                current = job.generation,
                "submission replaced, driver stopping"
            );
            return TickOutcome::Done;
        }
        self.step(&mut job).await
    }

    async fn step(&self, job: &mut Job) -> TickOutcome {
        let outcome = match job.phase {
            JobPhase::Idle | JobPhase::Completed | JobPhase::Failed => TickOutcome::Done,
            JobPhase::Uploading => self.upload(job).await,
            JobPhase::Waiting => {
                self.transition(job, JobPhase::DiscoveringRun);
                TickOutcome::Wait(Duration::ZERO)
            }
            JobPhase::DiscoveringRun => self.discover(job).await,
            JobPhase::Monitoring => self.monitor(job).await,
        };
        self.publish(job);
        outcome
    }

    async fn upload(&self, job: &mut Job) -> TickOutcome {
        let Some(file) = job.file.clone() else {
            return self.fail(job, Error::NoFileSelected);
        };

        match self.backend.upload(&file.content, &file.name).await {
            Ok(commit) => {
                info!(path = %commit.path, commit = ?commit.commit_sha, "source uploaded");
                self.emit(JobEvent::Uploaded {
                    commit: commit.clone(),
                });
                job.commit = Some(commit);
                self.transition(job, JobPhase::Waiting);
                TickOutcome::Wait(self.polling.settle_delay)
            }
            Err(e) => self.fail(job, e),
        }
    }

    async fn discover(&self, job: &mut Job) -> TickOutcome {
        match self.backend.get_latest_run().await {
            Ok(run) => {
                info!(run_id = %run.id, status = %run.status, "monitoring workflow run");
                self.emit(JobEvent::RunDiscovered {
                    run_id: run.id,
                    created_at: run.created_at,
                });
                job.run = Some(run);
                job.attempts = 0;
                self.transition(job, JobPhase::Monitoring);
                TickOutcome::Wait(self.polling.poll_interval)
            }
            Err(e) => self.fail(job, e),
        }
    }

    /// One status check; also used by [`Orchestrator::refresh`]
    pub(super) async fn monitor(&self, job: &mut Job) -> TickOutcome {
        let Some(run_id) = job.run.as_ref().map(|r| r.id) else {
            return self.fail(job, Error::Other("no workflow run to monitor".into()));
        };
        let max_attempts = self.polling.max_poll_attempts;
        if job.attempts >= max_attempts {
            let attempts = job.attempts;
            return self.fail(job, Error::Timeout { run_id, attempts });
        }

        job.attempts += 1;
        let run = match self.backend.get_run_status(run_id).await {
            Ok(run) => run,
            Err(e) => return self.fail(job, e),
        };

        debug!(
            run_id = %run_id,
            status = %run.status,
            conclusion = ?run.conclusion,
            attempt = job.attempts,
            max_attempts,
            "status check"
        );
        self.emit(JobEvent::StatusChecked {
            run_id,
            status: run.status,
            conclusion: run.conclusion,
            attempt: job.attempts,
            max_attempts,
        });

        let terminal = run.is_terminal();
        let succeeded = run.succeeded();
        let conclusion = run.conclusion;
        job.run = Some(run);

        if !terminal {
            if job.attempts >= max_attempts {
                let attempts = job.attempts;
                return self.fail(job, Error::Timeout { run_id, attempts });
            }
            self.publish(job);
            return TickOutcome::Wait(self.polling.poll_interval);
        }

        if !succeeded {
            let conclusion = conclusion.unwrap_or(RunConclusion::Unknown);
            return self.fail(job, Error::RunConcluded { run_id, conclusion });
        }

        self.complete(job, run_id).await
    }

    async fn complete(&self, job: &mut Job, run_id: RunId) -> TickOutcome {
        let artifacts = match self.backend.get_artifacts(run_id).await {
            Ok(artifacts) => artifacts,
            Err(e) => return self.fail(job, e),
        };

        if artifacts.is_empty() {
            warn!(run_id = %run_id, "workflow run succeeded without producing artifacts");
        } else {
            info!(run_id = %run_id, count = artifacts.len(), "artifacts ready");
        }
        self.emit(JobEvent::ArtifactsReady {
            run_id,
            artifacts: artifacts.clone(),
        });
        job.artifacts = artifacts;

        self.cleanup(job).await;
        self.transition(job, JobPhase::Completed);
        TickOutcome::Done
    }

    /// Remove the uploaded source at most once; failures never fail the job
    async fn cleanup(&self, job: &mut Job) {
        if !self.polling.cleanup_source || job.source_deleted {
            return;
        }
        let Some(name) = job.file.as_ref().map(|f| f.name.clone()) else {
            return;
        };

        match self.backend.delete_file(&name).await {
            Ok(commit) => {
                info!(path = %commit.path, "removed uploaded source");
                job.source_deleted = true;
                self.emit(JobEvent::SourceDeleted { path: commit.path });
            }
            Err(Error::NotFound(message)) => {
                debug!(file = %name, %message, "uploaded source already removed");
                job.source_deleted = true;
            }
            Err(Error::Conflict(message)) => {
                debug!(file = %name, %message, "uploaded source changed since upload, leaving it");
            }
            Err(e) => {
                warn!(file = %name, error = %e, "failed to remove uploaded source");
                self.emit(JobEvent::CleanupFailed {
                    error: ErrorDetail::from(&e),
                });
            }
        }
    }

    /// Record `error` and move to [`JobPhase::Failed`]
    pub(super) fn fail(&self, job: &mut Job, error: Error) -> TickOutcome {
        if matches!(error, Error::Cancelled) {
            info!(phase = %job.phase, "submission cancelled");
        } else {
            error!(phase = %job.phase, code = error.code(), error = %error, "submission failed");
        }
        let detail = ErrorDetail::from(&error);
        job.failure = Some(detail.clone());
        self.emit(JobEvent::Failed { error: detail });
        self.transition(job, JobPhase::Failed);
        TickOutcome::Done
    }
}
