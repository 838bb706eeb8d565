//! Workflow run discovery and status.

use super::GitHubClient;
use super::models::{ArtifactsPage, RunsPage};
use crate::error::{Error, Result};
use crate::types::{Artifact, AutomationRun, RunId};
use tracing::{debug, info};

impl GitHubClient {
    /// The most recently created workflow run
    ///
    /// The provider gives no direct link between a commit and the run it
    /// triggers, so the newest run by creation time is taken.
    ///
    /// # Errors
    /// Returns [`Error::NoRuns`] if the repository has no runs at all
    pub async fn latest_run(&self) -> Result<AutomationRun> {
        let url = self.repo_url(&format!(
            "/actions/runs?per_page={}",
            self.config.polling.runs_per_page
        ));
        let page: RunsPage = self.http.get_json(&url, "workflow runs").await?;

        let run = page
            .workflow_runs
            .into_iter()
            .max_by_key(|run| run.created_at)
            .ok_or(Error::NoRuns)?;

        info!(run_id = %run.id, status = %run.status, created_at = %run.created_at, "found latest workflow run");
        Ok(run)
    }

    /// Current status of a run
    pub async fn run_status(&self, id: RunId) -> Result<AutomationRun> {
        let url = self.repo_url(&format!("/actions/runs/{}", id));
        let run: AutomationRun = self.http.get_json(&url, "workflow run").await?;
        debug!(run_id = %id, status = %run.status, conclusion = ?run.conclusion, "workflow run status");
        Ok(run)
    }

    /// Artifacts produced by a run; an empty list is a valid answer
    pub async fn artifacts(&self, id: RunId) -> Result<Vec<Artifact>> {
        let url = self.repo_url(&format!("/actions/runs/{}/artifacts", id));
        let page: ArtifactsPage = self.http.get_json(&url, "run artifacts").await?;
        debug!(run_id = %id, count = page.artifacts.len(), "listed artifacts");
        Ok(page.artifacts)
    }
}
