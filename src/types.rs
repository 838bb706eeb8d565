//! Core types for actions-bridge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a workflow run
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RunId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a build artifact
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u64);

impl ArtifactId {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ArtifactId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file selected by the caller for upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Logical file name (e.g., "script.py")
    pub name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl SourceFile {
    /// Create a source file from a name and its content
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A file as stored in the remote repository
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFile {
    /// Logical file name
    pub name: String,
    /// Decoded content
    pub content: Vec<u8>,
    /// Path inside the repository
    pub path: String,
    /// Current revision (blob sha); `None` until the file exists remotely
    pub sha: Option<String>,
}

/// Outcome of a content write or delete
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Path inside the repository
    pub path: String,
    /// New blob sha of the file (absent after a delete)
    pub content_sha: Option<String>,
    /// Sha of the commit that recorded the change
    pub commit_sha: Option<String>,
}

/// Lifecycle status of a workflow run as reported by the provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting for a runner
    Queued,
    /// Executing
    InProgress,
    /// Finished; a conclusion is available
    Completed,
    /// Waiting on an environment protection rule
    Waiting,
    /// Created but not yet queued
    Requested,
    /// Pending concurrency group
    Pending,
    /// Any value this crate does not know about
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether no further status change will occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Waiting => "waiting",
            RunStatus::Requested => "requested",
            RunStatus::Pending => "pending",
            RunStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Final outcome of a completed workflow run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    /// All jobs succeeded
    Success,
    /// At least one job failed
    Failure,
    /// Cancelled by a user or by concurrency rules
    Cancelled,
    /// Skipped by workflow conditions
    Skipped,
    /// Exceeded the provider's time limit
    TimedOut,
    /// Needs manual approval
    ActionRequired,
    /// Neutral check outcome
    Neutral,
    /// Superseded
    Stale,
    /// The run could not start
    StartupFailure,
    /// Any value this crate does not know about
    #[serde(other)]
    Unknown,
}

impl RunConclusion {
    /// Whether the run produced a successful build
    pub fn is_success(&self) -> bool {
        matches!(self, RunConclusion::Success)
    }
}

impl std::fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunConclusion::Success => "success",
            RunConclusion::Failure => "failure",
            RunConclusion::Cancelled => "cancelled",
            RunConclusion::Skipped => "skipped",
            RunConclusion::TimedOut => "timed_out",
            RunConclusion::ActionRequired => "action_required",
            RunConclusion::Neutral => "neutral",
            RunConclusion::Stale => "stale",
            RunConclusion::StartupFailure => "startup_failure",
            RunConclusion::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One execution of the repository's CI automation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRun {
    /// Run identifier
    pub id: RunId,
    /// Workflow name, if reported
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle status
    pub status: RunStatus,
    /// Conclusion, present once the status is terminal
    #[serde(default)]
    pub conclusion: Option<RunConclusion>,
    /// Creation time, used to infer the run belonging to a write
    pub created_at: DateTime<Utc>,
    /// Commit the run was triggered for
    #[serde(default)]
    pub head_sha: Option<String>,
    /// Triggering event (e.g., "push")
    #[serde(default)]
    pub event: Option<String>,
    /// Web page of the run
    #[serde(default)]
    pub html_url: Option<String>,
}

impl AutomationRun {
    /// Whether the run is finished
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the run finished with a successful conclusion
    pub fn succeeded(&self) -> bool {
        self.is_terminal() && self.conclusion.is_some_and(|c| c.is_success())
    }
}

/// A downloadable output of a completed run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier
    pub id: ArtifactId,
    /// Display name (e.g., "script.exe")
    pub name: String,
    /// Set once the retention period has passed; expired artifacts cannot be downloaded
    pub expired: bool,
    /// Compressed size in bytes
    #[serde(default)]
    pub size_in_bytes: u64,
    /// When the artifact will expire
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Artifact {
    /// Whether the artifact can still be fetched
    pub fn is_downloadable(&self) -> bool {
        !self.expired
    }
}

/// Result of the access diagnostics probe
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessReport {
    /// Login the token authenticates as
    pub login: String,
    /// `owner/repo` as reported by the provider
    pub repository: String,
    /// Whether the repository is private
    pub private: bool,
    /// Whether the token may push (required for uploads)
    pub can_push: bool,
    /// Whether the repository contents endpoint is readable
    pub contents_readable: bool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_deserializes_from_provider_shape() {
        let json = r#"{
            "id": 42,
            "name": "Build executable",
            "status": "in_progress",
            "conclusion": null,
            "created_at": "2024-05-01T12:00:00Z",
            "head_sha": "abc123",
            "event": "push",
            "html_url": "https://github.com/octo/tools/actions/runs/42",
            "run_number": 17
        }"#;
        let run: AutomationRun = serde_json::from_str(json).unwrap();

        assert_eq!(run.id, RunId(42));
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.conclusion.is_none());
        assert!(!run.is_terminal());
        assert!(!run.succeeded());
    }

    #[test]
    fn unknown_status_and_conclusion_are_tolerated() {
        let json = r#"{
            "id": 1,
            "status": "some_new_status",
            "conclusion": "some_new_conclusion",
            "created_at": "2024-05-01T12:00:00Z"
        }"#;
        let run: AutomationRun = serde_json::from_str(json).unwrap();

        assert_eq!(run.status, RunStatus::Unknown);
        assert_eq!(run.conclusion, Some(RunConclusion::Unknown));
        assert!(!run.is_terminal());
    }

    #[test]
    fn completed_success_is_success_only_when_terminal() {
        let mut run: AutomationRun = serde_json::from_str(
            r#"{"id": 3, "status": "completed", "conclusion": "success", "created_at": "2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(run.succeeded());

        run.conclusion = Some(RunConclusion::Failure);
        assert!(run.is_terminal());
        assert!(!run.succeeded());
    }

    #[test]
    fn expired_artifact_is_not_downloadable() {
        let artifact: Artifact = serde_json::from_str(
            r#"{"id": 9, "name": "script.exe", "expired": true, "size_in_bytes": 1024}"#,
        )
        .unwrap();
        assert!(!artifact.is_downloadable());
        assert_eq!(artifact.id.to_string(), "9");
    }

    #[test]
    fn display_matches_provider_spelling() {
        assert_eq!(RunStatus::InProgress.to_string(), "in_progress");
        assert_eq!(RunConclusion::TimedOut.to_string(), "timed_out");
        assert_eq!(
            serde_json::to_string(&RunConclusion::StartupFailure).unwrap(),
            "\"startup_failure\""
        );
    }
}
