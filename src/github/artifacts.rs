//! Artifact metadata and payload download.
//!
//! The zip endpoint either answers with the payload directly or redirects to a
//! pre-signed blob URL. Both are handled: the direct authenticated request is
//! made without following redirects, and a redirect target is then fetched
//! without the credential.

use super::GitHubClient;
use crate::error::{Error, Result};
use crate::http::RequestOptions;
use crate::types::{Artifact, ArtifactId};
use reqwest::Method;
use reqwest::header::LOCATION;
use tracing::{debug, info};

/// Outcome of the direct download attempt
enum DirectDownload {
    /// The payload was returned in the response body
    Payload(Vec<u8>),
    /// The provider pointed at another URL
    Redirect(String),
}

impl GitHubClient {
    /// Metadata of a single artifact
    pub async fn artifact(&self, id: ArtifactId) -> Result<Artifact> {
        let url = self.repo_url(&format!("/actions/artifacts/{}", id));
        self.http.get_json(&url, "artifact").await
    }

    /// Download an artifact's zip payload
    ///
    /// # Errors
    /// Returns [`Error::ArtifactExpired`] without issuing any download request if
    /// the artifact has expired.
    pub async fn fetch_artifact_payload(&self, id: ArtifactId) -> Result<Vec<u8>> {
        let artifact = self.artifact(id).await?;
        if !artifact.is_downloadable() {
            return Err(Error::ArtifactExpired { id });
        }

        let bytes = match self.download_direct(id).await? {
            DirectDownload::Payload(bytes) => bytes,
            DirectDownload::Redirect(target) => {
                debug!(artifact_id = %id, "following artifact redirect without credentials");
                self.http.get_unauthenticated(&target).await?
            }
        };

        info!(artifact_id = %id, name = %artifact.name, bytes = bytes.len(), "downloaded artifact");
        Ok(bytes)
    }

    async fn download_direct(&self, id: ArtifactId) -> Result<DirectDownload> {
        let url = self.repo_url(&format!("/actions/artifacts/{}/zip", id));
        let response = self
            .http
            .request(Method::GET, &url, None, RequestOptions::accept_redirect())
            .await?;

        let status = response.status();
        if !status.is_redirection() {
            return Ok(DirectDownload::Payload(response.bytes().await?.to_vec()));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Api {
                status: status.as_u16(),
                message: "redirect without a Location header".to_string(),
            })?;

        // Location may be relative to the request URL
        let target = url::Url::parse(&url)
            .and_then(|base| base.join(location))
            .map_err(|e| Error::Api {
                status: status.as_u16(),
                message: format!("invalid redirect location {location}: {e}"),
            })?;

        Ok(DirectDownload::Redirect(target.to_string()))
    }
}
