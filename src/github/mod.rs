//! GitHub REST client split into focused submodules.
//!
//! The `GitHubClient` struct and its methods are organized by resource:
//! - [`contents`] - Repository file read/create/update/delete
//! - [`runs`] - Workflow run discovery and status
//! - [`artifacts`] - Artifact metadata and payload download
//! - [`diagnostics`] - Token and repository access checks
//! - [`models`] - Response shapes of the REST endpoints

mod artifacts;
mod contents;
mod diagnostics;
pub(crate) mod models;
mod runs;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::backend::RepositoryBackend;
use crate::config::Config;
use crate::error::Result;
use crate::http::HttpClient;
use crate::types::{Artifact, ArtifactId, AutomationRun, CommitInfo, RunId};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for one configured repository (cloneable - all fields are cheap to clone)
#[derive(Clone)]
pub struct GitHubClient {
    /// Retrying transport
    pub(crate) http: HttpClient,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
}

impl GitHubClient {
    /// Create a client for the repository named in `config`
    ///
    /// # Errors
    /// Returns [`crate::Error::Config`] if the configuration is incomplete
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new(&config.github, config.retry.clone())?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        self.config.github.full_name()
    }

    fn api_base(&self) -> &str {
        self.config.github.api_base.trim_end_matches('/')
    }

    /// URL of an account-level endpoint, e.g. `/user`
    pub(crate) fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base(), endpoint)
    }

    /// URL of a repository endpoint; `suffix` starts with `/` or is empty
    pub(crate) fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base(),
            urlencoding::encode(&self.config.github.owner),
            urlencoding::encode(&self.config.github.repo),
            suffix
        )
    }

    /// URL of a file in the contents API, encoding each path segment
    pub(crate) fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<_> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        self.repo_url(&format!("/contents/{}", encoded.join("/")))
    }
}

#[async_trait]
impl RepositoryBackend for GitHubClient {
    async fn upload(&self, content: &[u8], name: &str) -> Result<CommitInfo> {
        GitHubClient::upload(self, content, name).await
    }

    async fn get_latest_run(&self) -> Result<AutomationRun> {
        self.latest_run().await
    }

    async fn get_run_status(&self, id: RunId) -> Result<AutomationRun> {
        self.run_status(id).await
    }

    async fn get_artifacts(&self, id: RunId) -> Result<Vec<Artifact>> {
        self.artifacts(id).await
    }

    async fn download_artifact(&self, id: ArtifactId) -> Result<Vec<u8>> {
        self.fetch_artifact_payload(id).await
    }

    async fn delete_file(&self, name: &str) -> Result<CommitInfo> {
        GitHubClient::delete_file(self, name).await
    }
}
