//! Submission state machine
//!
//! The [`Orchestrator`] drives one submission at a time through
//! `Idle -> Uploading -> Waiting -> DiscoveringRun -> Monitoring -> Completed | Failed`.
//! Its behaviour is split across submodules:
//! - [`job`] - Phases, snapshots, events and tick outcomes
//! - [`scheduler`] - The delay seam used by the driver
//! - `transitions` - [`Orchestrator::tick`], the single transition function
//! - `driver` - [`Orchestrator::run`] and [`Orchestrator::refresh`]
//!
//! # Example
//!
//! ```no_run
//! use actions_bridge::{Config, GitHubClient, Orchestrator, SourceFile};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> actions_bridge::Result<()> {
//! let client = GitHubClient::new(Config::from_env()?)?;
//! let orchestrator = Orchestrator::for_client(client);
//!
//! let mut events = orchestrator.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//! });
//!
//! orchestrator.select_file(Some(SourceFile::new("script.py", "print(1)"))).await;
//! orchestrator.start().await?;
//! let snapshot = orchestrator.run(CancellationToken::new()).await;
//! println!("finished in phase {}", snapshot.phase);
//! # Ok(())
//! # }
//! ```

mod driver;
pub mod job;
pub mod scheduler;
mod transitions;


pub use job::{JobEvent, JobPhase, JobSnapshot, TickOutcome};
pub use scheduler::{Scheduler, TokioScheduler};

use crate::backend::RepositoryBackend;
use crate::config::PollingConfig;
use crate::error::{Error, Result};
use crate::github::GitHubClient;
use crate::types::{ArtifactId, SourceFile};
use job::Job;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info};

/// Drives a submission from upload to downloadable artifacts
///
/// All methods take `&self`; share the orchestrator behind an `Arc` to let the
/// presentation layer read snapshots while [`run`](Self::run) is polling.
pub struct Orchestrator {
    /// Repository operations
    backend: Arc<dyn RepositoryBackend>,
    /// Delays and attempt ceiling
    polling: PollingConfig,
    /// Delay source for the driver loop
    scheduler: Arc<dyn Scheduler>,
    /// Current submission; held across backend calls so transitions never interleave
    job: Mutex<Job>,
    /// Latest snapshot, readable without waiting for an in-flight tick
    snapshot_tx: watch::Sender<JobSnapshot>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: broadcast::Sender<JobEvent>,
}

impl Orchestrator {
    /// Create an orchestrator that sleeps with tokio timers
    pub fn new(backend: Arc<dyn RepositoryBackend>, polling: PollingConfig) -> Self {
        Self::with_scheduler(backend, polling, Arc::new(TokioScheduler))
    }

    /// Create an orchestrator with a custom delay source
    pub fn with_scheduler(
        backend: Arc<dyn RepositoryBackend>,
        polling: PollingConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let job = Job::default();
        let (snapshot_tx, _) = watch::channel(job.snapshot(polling.max_poll_attempts));
        let (event_tx, _) = broadcast::channel(256);
        Self {
            backend,
            polling,
            scheduler,
            job: Mutex::new(job),
            snapshot_tx,
            event_tx,
        }
    }

    /// Orchestrator over a GitHub client, using the client's polling settings
    pub fn for_client(client: GitHubClient) -> Self {
        let polling = client.config().polling.clone();
        Self::new(Arc::new(client), polling)
    }

    /// Subscribe to job events
    ///
    /// Each subscriber receives every event emitted after subscribing. Slow
    /// subscribers that fall more than 256 events behind miss the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Receiver that is notified whenever the snapshot changes
    pub fn watch(&self) -> watch::Receiver<JobSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Current observable state
    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Select the file for the next submission, or clear the selection
    ///
    /// Always resets the job to [`JobPhase::Idle`]. A driver still running for
    /// the previous submission returns at its next tick without touching the
    /// new one, even if the new one has already been started.
    pub async fn select_file(&self, file: Option<SourceFile>) {
        let mut job = self.job.lock().await;
        let from = job.phase;
        debug!(
            file = file.as_ref().map(|f| f.name.as_str()),
            "file selection changed"
        );
        job.reset(file);
        if from != JobPhase::Idle {
            self.emit(JobEvent::PhaseChanged {
                from,
                to: JobPhase::Idle,
            });
        }
        self.publish(&job);
    }

    /// Begin the submission of the selected file
    ///
    /// Moves the job to [`JobPhase::Uploading`]; the upload itself happens on
    /// the next [`tick`](Self::tick). Starting again after a terminal phase
    /// resubmits the same file.
    ///
    /// # Errors
    /// - [`Error::NoFileSelected`] if no file is selected (the job stays idle)
    /// - [`Error::JobInProgress`] if a submission is already running
    pub async fn start(&self) -> Result<()> {
        let mut job = self.job.lock().await;
        if job.phase.is_active() {
            return Err(Error::JobInProgress {
                phase: job.phase.to_string(),
            });
        }
        let Some(file) = job.file.take() else {
            return Err(Error::NoFileSelected);
        };

        info!(file = %file.name, bytes = file.content.len(), "starting submission");
        let from = job.phase;
        job.reset(Some(file));
        job.phase = from;
        self.transition(&mut job, JobPhase::Uploading);
        Ok(())
    }

    /// Download one of the completed run's artifacts
    pub async fn download_artifact(&self, id: ArtifactId) -> Result<Vec<u8>> {
        self.backend.download_artifact(id).await
    }

    /// Move to `to`, announcing the change
    fn transition(&self, job: &mut Job, to: JobPhase) {
        let from = job.phase;
        if from == to {
            return;
        }
        job.phase = to;
        info!(%from, %to, "job phase changed");
        self.emit(JobEvent::PhaseChanged { from, to });
        self.publish(job);
    }

    fn publish(&self, job: &Job) {
        self.snapshot_tx
            .send_replace(job.snapshot(self.polling.max_poll_attempts));
    }

    /// Emit an event to all subscribers
    ///
    /// Events are dropped when nobody is subscribed.
    fn emit(&self, event: JobEvent) {
        self.event_tx.send(event).ok();
    }
}
