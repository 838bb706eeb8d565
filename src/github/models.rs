//! Response shapes of the GitHub REST endpoints used by this crate.
//!
//! Only the fields the crate reads are declared; serde ignores the rest.

use crate::types::{Artifact, AutomationRun};
use serde::Deserialize;

/// `GET /repos/{owner}/{repo}/contents/{path}` for a file
#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntry {
    pub(crate) sha: String,
    #[serde(default)]
    pub(crate) path: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) encoding: Option<String>,
}

/// `PUT`/`DELETE /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize)]
pub(crate) struct ContentWrite {
    #[serde(default)]
    pub(crate) content: Option<ContentEntryRef>,
    pub(crate) commit: CommitRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntryRef {
    pub(crate) sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitRef {
    #[serde(default)]
    pub(crate) sha: Option<String>,
}

/// `GET /repos/{owner}/{repo}/actions/runs`
#[derive(Debug, Deserialize)]
pub(crate) struct RunsPage {
    #[serde(default)]
    pub(crate) workflow_runs: Vec<AutomationRun>,
}

/// `GET /repos/{owner}/{repo}/actions/runs/{id}/artifacts`
#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactsPage {
    #[serde(default)]
    pub(crate) artifacts: Vec<Artifact>,
}

/// `GET /user`
#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticatedUser {
    pub(crate) login: String,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryInfo {
    pub(crate) full_name: String,
    #[serde(default)]
    pub(crate) private: bool,
    #[serde(default)]
    pub(crate) permissions: Option<RepositoryPermissions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryPermissions {
    #[serde(default)]
    pub(crate) push: bool,
}
