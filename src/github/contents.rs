//! Repository file gateway (contents API).
//!
//! Writes follow an existence-check-then-write protocol: the current revision
//! (blob sha) is looked up first and sent with the write only when the file
//! already exists. The lookup is best-effort; if it fails the write is attempted
//! as a create and the provider's own conflict response decides.

use super::GitHubClient;
use super::models::{ContentEntry, ContentWrite};
use crate::error::{Error, Result};
use crate::http::{RequestOptions, read_json};
use crate::types::{CommitInfo, RemoteFile};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Method, StatusCode};
use tracing::{debug, info, warn};

impl GitHubClient {
    /// Current revision of a file, or `None` if it does not exist
    ///
    /// A 404 is an expected outcome here, not an error.
    pub async fn exists(&self, path: &str) -> Result<Option<String>> {
        let url = self.contents_url(path);
        let response = self
            .http
            .request(Method::GET, &url, None, RequestOptions::allow_not_found())
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "file does not exist");
            return Ok(None);
        }

        let entry: ContentEntry = read_json(response, "content entry").await?;
        debug!(path, sha = %entry.sha, "file exists");
        Ok(Some(entry.sha))
    }

    /// Read and decode a file
    pub async fn read(&self, path: &str) -> Result<RemoteFile> {
        let url = self.contents_url(path);
        let entry: ContentEntry = self.http.get_json(&url, "content entry").await?;

        let raw = entry.content.unwrap_or_default();
        let content = match entry.encoding.as_deref() {
            Some("base64") | None => {
                // The API wraps base64 content at 60 columns
                let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                BASE64.decode(compact).map_err(|e| Error::Parse {
                    context: "file content".to_string(),
                    message: e.to_string(),
                    snippet: raw.chars().take(200).collect(),
                })?
            }
            Some(_) => raw.into_bytes(),
        };

        let path = entry.path.unwrap_or_else(|| path.to_string());
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Ok(RemoteFile {
            name,
            content,
            path,
            sha: Some(entry.sha),
        })
    }

    /// Create or update a file
    ///
    /// The current revision is re-resolved on every call. If that lookup fails
    /// the failure is logged and `known_revision` (usually `None`) is used
    /// instead, so a stale or missing revision surfaces as [`Error::Conflict`].
    ///
    /// # Errors
    /// - [`Error::Unauthorized`] - the token was rejected
    /// - [`Error::Forbidden`] - the token lacks write scope
    /// - [`Error::RepositoryNotFound`] - owner/repo do not exist or are invisible
    /// - [`Error::Conflict`] - the provider rejected the revision
    pub async fn write(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        known_revision: Option<&str>,
    ) -> Result<CommitInfo> {
        let sha = match self.exists(path).await {
            Ok(sha) => sha,
            Err(e) => {
                warn!(path, error = %e, "existence check failed, treating file as absent");
                known_revision.map(str::to_string)
            }
        };

        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content),
        });
        if let Some(sha) = &sha {
            body["sha"] = serde_json::Value::String(sha.clone());
        }

        info!(
            path,
            bytes = content.len(),
            update = sha.is_some(),
            repository = %self.repository(),
            "writing file"
        );

        let url = self.contents_url(path);
        let response = self
            .http
            .request(Method::PUT, &url, Some(&body), RequestOptions::default())
            .await
            .map_err(|e| self.classify_write_error(e))?;

        let written: ContentWrite = read_json(response, "content write").await?;
        Ok(CommitInfo {
            path: path.to_string(),
            content_sha: written.content.map(|c| c.sha),
            commit_sha: written.commit.sha,
        })
    }

    /// Delete a file
    ///
    /// Deleting a file that does not exist is an error, not a no-op.
    pub async fn delete(&self, path: &str, message: &str) -> Result<CommitInfo> {
        let Some(sha) = self.exists(path).await? else {
            return Err(Error::NotFound(format!(
                "{} does not exist in {}",
                path,
                self.repository()
            )));
        };

        info!(path, sha = %sha, "deleting file");

        let body = serde_json::json!({
            "message": message,
            "sha": sha,
        });
        let url = self.contents_url(path);
        let response = self
            .http
            .request(Method::DELETE, &url, Some(&body), RequestOptions::default())
            .await
            .map_err(|e| match e {
                Error::Api {
                    status: 409,
                    message,
                } => Error::Conflict(message),
                other => other,
            })?;

        let written: ContentWrite = read_json(response, "content delete").await?;
        Ok(CommitInfo {
            path: path.to_string(),
            content_sha: None,
            commit_sha: written.commit.sha,
        })
    }

    /// Upload a named file into the configured upload directory
    pub async fn upload(&self, content: &[u8], name: &str) -> Result<CommitInfo> {
        let upload = &self.config.upload;
        let path = upload.remote_path(name);
        self.write(&path, content, &upload.upload_message_for(name), None)
            .await
    }

    /// Remove a named file from the configured upload directory
    pub async fn delete_file(&self, name: &str) -> Result<CommitInfo> {
        let upload = &self.config.upload;
        let path = upload.remote_path(name);
        self.delete(&path, &upload.delete_message_for(name)).await
    }

    fn classify_write_error(&self, error: Error) -> Error {
        match error {
            Error::NotFound(_) => Error::RepositoryNotFound {
                repository: self.repository(),
            },
            Error::Api {
                status: 409 | 422,
                message,
            } => Error::Conflict(message),
            other => other,
        }
    }
}
