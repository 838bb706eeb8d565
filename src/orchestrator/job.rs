//! Observable job state: phases, snapshots, events and tick outcomes

use crate::error::ErrorDetail;
use crate::types::{
    Artifact, AutomationRun, CommitInfo, RunConclusion, RunId, RunStatus, SourceFile,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phase of a submission
///
/// ```text
/// Idle -> Uploading -> Waiting -> DiscoveringRun -> Monitoring -> Completed
///            |                          |               |
///            +--------------------------+---------------+--> Failed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Writing the source file to the repository
    Uploading,
    /// Giving the provider time to register the run triggered by the write
    Waiting,
    /// Looking up the run triggered by the write
    DiscoveringRun,
    /// Polling the run until it concludes
    Monitoring,
    /// The run succeeded and its artifacts are listed
    Completed,
    /// The submission stopped with an error
    Failed,
}

impl JobPhase {
    /// Whether the submission has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed)
    }

    /// Whether the submission is between `start` and a terminal phase
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && *self != JobPhase::Idle
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobPhase::Idle => "idle",
            JobPhase::Uploading => "uploading",
            JobPhase::Waiting => "waiting",
            JobPhase::DiscoveringRun => "discovering_run",
            JobPhase::Monitoring => "monitoring",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What the driver should do after a [`tick`](super::Orchestrator::tick)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick again after the given delay (zero means immediately)
    Wait(Duration),
    /// Nothing left to do: the job is idle or terminal
    Done,
}

impl TickOutcome {
    /// Delay before the next tick, or `None` when done
    pub fn delay(&self) -> Option<Duration> {
        match self {
            TickOutcome::Wait(delay) => Some(*delay),
            TickOutcome::Done => None,
        }
    }
}

/// Point-in-time view of a submission for the presentation layer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Current phase
    pub phase: JobPhase,
    /// Name of the selected file
    pub file_name: Option<String>,
    /// Repository path the file was written to
    pub remote_path: Option<String>,
    /// Run being monitored
    pub run_id: Option<RunId>,
    /// Last reported run status
    pub run_status: Option<RunStatus>,
    /// Run conclusion once terminal
    pub conclusion: Option<RunConclusion>,
    /// Web page of the run
    pub run_url: Option<String>,
    /// Status checks performed so far
    pub attempts: u32,
    /// Status checks allowed before giving up
    pub max_attempts: u32,
    /// Artifacts of a completed run
    pub artifacts: Vec<Artifact>,
    /// Why the submission failed
    pub failure: Option<ErrorDetail>,
    /// Whether the uploaded source was removed after the build
    pub source_deleted: bool,
    /// When this snapshot was taken
    pub updated_at: DateTime<Utc>,
}

/// Event emitted while a submission progresses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// The job moved to another phase
    PhaseChanged {
        /// Previous phase
        from: JobPhase,
        /// New phase
        to: JobPhase,
    },

    /// The source file was written
    Uploaded {
        /// Commit recording the write
        commit: CommitInfo,
    },

    /// The run triggered by the write was found
    RunDiscovered {
        /// Run identifier
        run_id: RunId,
        /// When the provider created the run
        created_at: DateTime<Utc>,
    },

    /// A status check returned
    StatusChecked {
        /// Run identifier
        run_id: RunId,
        /// Reported status
        status: RunStatus,
        /// Reported conclusion, if terminal
        #[serde(skip_serializing_if = "Option::is_none")]
        conclusion: Option<RunConclusion>,
        /// 1-based number of this check
        attempt: u32,
        /// Checks allowed in total
        max_attempts: u32,
    },

    /// The run succeeded and its artifacts were listed
    ArtifactsReady {
        /// Run identifier
        run_id: RunId,
        /// Artifacts produced (possibly none)
        artifacts: Vec<Artifact>,
    },

    /// The uploaded source was removed from the repository
    SourceDeleted {
        /// Repository path that was removed
        path: String,
    },

    /// Removing the uploaded source failed; the build result still stands
    CleanupFailed {
        /// Why removal failed
        error: ErrorDetail,
    },

    /// The submission failed
    Failed {
        /// Why it failed
        error: ErrorDetail,
    },
}

/// Mutable state of the current submission
#[derive(Debug, Default)]
pub(super) struct Job {
    pub(super) phase: JobPhase,
    pub(super) file: Option<SourceFile>,
    pub(super) commit: Option<CommitInfo>,
    pub(super) run: Option<AutomationRun>,
    pub(super) attempts: u32,
    pub(super) artifacts: Vec<Artifact>,
    pub(super) failure: Option<ErrorDetail>,
    pub(super) source_deleted: bool,
    /// Bumped for every new selection or start; drivers stop once it moves on
    pub(super) generation: u64,
}

impl Job {
    /// Replace this job with a fresh one for `file`, under a new generation
    pub(super) fn reset(&mut self, file: Option<SourceFile>) {
        *self = Self {
            file,
            generation: self.generation.wrapping_add(1),
            ..Default::default()
        };
    }

    pub(super) fn snapshot(&self, max_attempts: u32) -> JobSnapshot {
        JobSnapshot {
            phase: self.phase,
            file_name: self.file.as_ref().map(|f| f.name.clone()),
            remote_path: self.commit.as_ref().map(|c| c.path.clone()),
            run_id: self.run.as_ref().map(|r| r.id),
            run_status: self.run.as_ref().map(|r| r.status),
            conclusion: self.run.as_ref().and_then(|r| r.conclusion),
            run_url: self.run.as_ref().and_then(|r| r.html_url.clone()),
            attempts: self.attempts,
            max_attempts,
            artifacts: self.artifacts.clone(),
            failure: self.failure.clone(),
            source_deleted: self.source_deleted,
            updated_at: Utc::now(),
        }
    }
}
