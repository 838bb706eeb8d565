//! Error types for actions-bridge
//!
//! This module provides the error taxonomy for the library, including:
//! - Transport failures (network, rate limiting, retry exhaustion)
//! - Provider outcomes mapped to distinct, user-facing variants (401, 403, 404, 409)
//! - Job-level failures (timeout, unsuccessful run conclusion, cancellation)
//! - Machine-readable error codes and a serializable [`ErrorDetail`] for UI consumers

use crate::types::{ArtifactId, RunConclusion, RunId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for actions-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for actions-bridge
///
/// Each variant carries enough context to render a user-facing message without
/// further lookups. Only [`Error::RateLimited`] and transient [`Error::Network`]
/// failures are retried (see [`crate::retry::IsRetryable`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "token")
        key: Option<String>,
    },

    /// A submission was started without a selected file
    #[error("no file selected: select a file before starting")]
    NoFileSelected,

    /// The provider rejected the credential (HTTP 401)
    #[error("authentication failed: check the configured access token ({0})")]
    Unauthorized(String),

    /// The credential is valid but lacks permission (HTTP 403 without rate-limit headers)
    #[error("access forbidden: the token lacks the required repository scope ({0})")]
    Forbidden(String),

    /// The target repository does not exist or is invisible to the token
    #[error("repository {repository} not found: check the owner and repository name")]
    RepositoryNotFound {
        /// `owner/repo` as configured
        repository: String,
    },

    /// Rate limited by the provider (HTTP 429, or 403 with rate-limit headers)
    #[error("rate limited (HTTP {status})")]
    RateLimited {
        /// Response status (403 or 429)
        status: u16,
        /// Server-supplied delay before the next attempt, if any
        retry_after: Option<Duration>,
    },

    /// Every allowed attempt was rate limited
    #[error("request failed after {attempts} attempts: retries exhausted")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
    },

    /// Resource not found where absence is not an acceptable outcome
    #[error("not found: {0}")]
    NotFound(String),

    /// The provider rejected a write because the revision is stale or missing
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Any other non-success provider response
    #[error("GitHub API error (HTTP {status}): {message}")]
    Api {
        /// Response status code
        status: u16,
        /// Best-available message extracted from the response body
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed response body
    #[error("failed to parse {context}: {message} (body: {snippet})")]
    Parse {
        /// What was being decoded (e.g., "workflow run")
        context: String,
        /// Decoder error message
        message: String,
        /// Leading part of the raw body for diagnosis
        snippet: String,
    },

    /// Polling exceeded its attempt ceiling
    #[error("workflow run {run_id} did not complete after {attempts} status checks")]
    Timeout {
        /// The run that was being monitored
        run_id: RunId,
        /// Number of status checks performed
        attempts: u32,
    },

    /// The run reached a terminal status with a non-success conclusion
    #[error("workflow run {run_id} concluded with {conclusion}")]
    RunConcluded {
        /// The run that concluded
        run_id: RunId,
        /// The reported conclusion
        conclusion: RunConclusion,
    },

    /// The repository has no automation runs at all
    #[error("no workflow runs found: check that a workflow is configured for this repository")]
    NoRuns,

    /// The artifact's retention period has passed
    #[error("artifact {id} has expired and can no longer be downloaded")]
    ArtifactExpired {
        /// The expired artifact
        id: ArtifactId,
    },

    /// The submission was cancelled before it reached a terminal state
    #[error("operation cancelled")]
    Cancelled,

    /// A submission is already uploading or being monitored
    #[error("a submission is already in progress ({phase})")]
    JobInProgress {
        /// Phase of the running submission
        phase: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Get the machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NoFileSelected => "no_file_selected",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::RepositoryNotFound { .. } => "repository_not_found",
            Error::RateLimited { .. } => "rate_limited",
            Error::RetriesExhausted { .. } => "retries_exhausted",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Api { .. } => "api_error",
            Error::Network(_) => "network_error",
            Error::Parse { .. } => "parse_error",
            Error::Timeout { .. } => "timeout",
            Error::RunConcluded { .. } => "run_failed",
            Error::NoRuns => "no_runs",
            Error::ArtifactExpired { .. } => "artifact_expired",
            Error::Cancelled => "cancelled",
            Error::JobInProgress { .. } => "job_in_progress",
            Error::Other(_) => "internal_error",
        }
    }

    /// HTTP status the provider answered with, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized(_) => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) | Error::RepositoryNotFound { .. } => Some(404),
            Error::RateLimited { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Error record handed to the presentation layer
///
/// # Example JSON
///
/// ```json
/// {
///   "code": "timeout",
///   "message": "workflow run 42 did not complete after 10 status checks",
///   "status": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "timeout")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Provider HTTP status, if the failure came from a response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&Error> for ErrorDetail {
    fn from(error: &Error) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            status: error.status(),
        }
    }
}

impl From<Error> for ErrorDetail {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_for_provider_classifications() {
        let unauthorized = Error::Unauthorized("Bad credentials".into());
        let forbidden = Error::Forbidden("Resource not accessible".into());
        let missing = Error::RepositoryNotFound {
            repository: "octo/missing".into(),
        };

        assert_eq!(unauthorized.code(), "unauthorized");
        assert_eq!(forbidden.code(), "forbidden");
        assert_eq!(missing.code(), "repository_not_found");
        assert_eq!(unauthorized.status(), Some(401));
        assert_eq!(forbidden.status(), Some(403));
        assert_eq!(missing.status(), Some(404));
    }

    #[test]
    fn user_facing_messages_name_the_remedy() {
        let msg = Error::Unauthorized("Bad credentials".into()).to_string();
        assert!(msg.contains("access token"), "got: {msg}");

        let msg = Error::RepositoryNotFound {
            repository: "octo/missing".into(),
        }
        .to_string();
        assert!(msg.contains("octo/missing"));
        assert!(msg.contains("repository name"));

        let msg = Error::NoRuns.to_string();
        assert!(msg.contains("workflow is configured"));
    }

    #[test]
    fn run_concluded_reports_conclusion() {
        let err = Error::RunConcluded {
            run_id: RunId(42),
            conclusion: RunConclusion::Failure,
        };
        assert_eq!(err.to_string(), "workflow run 42 concluded with failure");
        assert_eq!(err.code(), "run_failed");
    }

    #[test]
    fn error_detail_serializes_without_status_when_absent() {
        let detail = ErrorDetail::from(Error::Timeout {
            run_id: RunId(7),
            attempts: 10,
        });
        let json = serde_json::to_value(&detail).unwrap();

        assert_eq!(json["code"], "timeout");
        assert!(json.get("status").is_none());
        assert!(json["message"].as_str().unwrap().contains("10 status checks"));
    }

    #[test]
    fn error_detail_carries_api_status() {
        let detail = ErrorDetail::from(&Error::Api {
            status: 422,
            message: "Invalid request".into(),
        });
        assert_eq!(detail.status, Some(422));
        assert_eq!(detail.code, "api_error");
    }
}
