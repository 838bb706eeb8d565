//! The caller-visible repository surface
//!
//! [`RepositoryBackend`] is the seam between the job orchestrator and the hosted
//! repository. [`crate::GitHubClient`] is the production implementation; tests
//! substitute scripted backends to drive the state machine deterministically.

use crate::error::Result;
use crate::types::{Artifact, ArtifactId, AutomationRun, CommitInfo, RunId};
use async_trait::async_trait;

/// Operations the orchestrator needs from a hosted repository
///
/// Every method reports failure through [`crate::Error`]; none of them swallow errors.
#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    /// Create or update the remote copy of `name`
    async fn upload(&self, content: &[u8], name: &str) -> Result<CommitInfo>;

    /// The most recently created automation run
    async fn get_latest_run(&self) -> Result<AutomationRun>;

    /// Current status and conclusion of a run
    async fn get_run_status(&self, id: RunId) -> Result<AutomationRun>;

    /// Artifacts produced by a run (possibly empty)
    async fn get_artifacts(&self, id: RunId) -> Result<Vec<Artifact>>;

    /// Payload of a non-expired artifact
    async fn download_artifact(&self, id: ArtifactId) -> Result<Vec<u8>>;

    /// Remove the remote copy of `name`; fails if it does not exist
    async fn delete_file(&self, name: &str) -> Result<CommitInfo>;
}
