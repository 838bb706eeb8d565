//! Token and repository access checks.
//!
//! Runs three probes in order and stops at the first failure:
//! 1. `GET /user` - the token authenticates
//! 2. `GET /repos/{owner}/{repo}` - the repository is visible
//! 3. `GET /repos/{owner}/{repo}/contents` - contents are readable (404 on an empty repository is fine)

use super::GitHubClient;
use super::models::{AuthenticatedUser, RepositoryInfo};
use crate::error::{Error, Result};
use crate::http::RequestOptions;
use crate::types::AccessReport;
use reqwest::Method;
use tracing::{info, warn};

impl GitHubClient {
    /// Check that the configured token can reach and write the repository
    pub async fn check_access(&self) -> Result<AccessReport> {
        let user: AuthenticatedUser = self
            .http
            .get_json(&self.api_url("/user"), "authenticated user")
            .await?;
        info!(login = %user.login, "token authenticated");

        let repo: RepositoryInfo = self
            .http
            .get_json(&self.repo_url(""), "repository")
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::RepositoryNotFound {
                    repository: self.repository(),
                },
                other => other,
            })?;
        let can_push = repo.permissions.as_ref().is_some_and(|p| p.push);
        info!(
            repository = %repo.full_name,
            private = repo.private,
            can_push,
            "repository visible"
        );
        if !can_push {
            warn!(repository = %repo.full_name, "token cannot push; uploads will be rejected");
        }

        let contents = self
            .http
            .request(
                Method::GET,
                &self.repo_url("/contents"),
                None,
                RequestOptions::allow_not_found(),
            )
            .await?;
        let contents_readable = contents.status().is_success();

        Ok(AccessReport {
            login: user.login,
            repository: repo.full_name,
            private: repo.private,
            can_push,
            contents_readable,
        })
    }
}
