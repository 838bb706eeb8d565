//! Configuration types for actions-bridge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default GitHub REST API base URL
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Credentials and identity of the target repository
#[derive(Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token (sent as `Authorization: Bearer <token>`)
    pub token: String,

    /// Account that owns the repository
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// REST API base URL (default: "https://api.github.com")
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Product identifier sent as the User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

// Hand-written so the token never ends up in logs
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl GitHubConfig {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Where and how uploaded files are committed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory inside the repository that receives uploads (default: "python-files")
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Commit message for uploads; `{name}` is replaced with the file name
    #[serde(default = "default_upload_message")]
    pub upload_message: String,

    /// Commit message for cleanup deletes; `{name}` is replaced with the file name
    #[serde(default = "default_delete_message")]
    pub delete_message: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            upload_message: default_upload_message(),
            delete_message: default_delete_message(),
        }
    }
}

impl UploadConfig {
    /// Repository path for a logical file name
    pub fn remote_path(&self, name: &str) -> String {
        let prefix = self.path_prefix.trim_matches('/');
        let name = name.trim_start_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }

    /// Render the upload commit message
    pub fn upload_message_for(&self, name: &str) -> String {
        self.upload_message.replace("{name}", name)
    }

    /// Render the delete commit message
    pub fn delete_message_for(&self, name: &str) -> String {
        self.delete_message.replace("{name}", name)
    }
}

/// Retry configuration for outbound requests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts including the first one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_millis_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries, also caps server-supplied delays (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_millis_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to computed delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Run discovery and monitoring policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between a successful upload and run discovery (default: 5 seconds)
    #[serde(default = "default_settle_delay", with = "duration_serde")]
    pub settle_delay: Duration,

    /// Delay before each status check (default: 3 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Maximum number of status checks before giving up (default: 10)
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Number of recent runs requested during discovery (default: 5)
    #[serde(default = "default_runs_per_page")]
    pub runs_per_page: u32,

    /// Delete the uploaded source file once its run succeeds (default: true)
    #[serde(default = "default_true")]
    pub cleanup_source: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            settle_delay: default_settle_delay(),
            poll_interval: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            runs_per_page: default_runs_per_page(),
            cleanup_source: true,
        }
    }
}

/// Main configuration for actions-bridge
///
/// Fields are organized into sub-configs:
/// - [`github`](GitHubConfig) - credentials and repository identity
/// - [`upload`](UploadConfig) - upload directory and commit messages
/// - [`retry`](RetryConfig) - transport retry policy
/// - [`polling`](PollingConfig) - run discovery, monitoring and cleanup
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credentials and repository identity
    pub github: GitHubConfig,

    /// Upload layout
    #[serde(default)]
    pub upload: UploadConfig,

    /// Transport retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Run monitoring policy
    #[serde(default)]
    pub polling: PollingConfig,
}

impl Config {
    /// Build a configuration from environment variables
    ///
    /// Required: `GITHUB_TOKEN`, `GITHUB_USERNAME`, `GITHUB_REPO`.
    /// Optional: `GITHUB_API_BASE`.
    ///
    /// Everything else uses defaults. The result is validated before returning.
    pub fn from_env() -> Result<Self> {
        let token = require_env("GITHUB_TOKEN", "token")?;
        let owner = require_env("GITHUB_USERNAME", "owner")?;
        let repo = require_env("GITHUB_REPO", "repo")?;

        let mut github = GitHubConfig {
            token,
            owner,
            repo,
            ..Default::default()
        };
        if let Ok(base) = std::env::var("GITHUB_API_BASE")
            && !base.trim().is_empty()
        {
            github.api_base = base;
        }

        let config = Config {
            github,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used
    pub fn validate(&self) -> Result<()> {
        if self.github.token.trim().is_empty() {
            return Err(Error::config("access token is missing", "token"));
        }
        if self.github.owner.trim().is_empty() {
            return Err(Error::config("repository owner is missing", "owner"));
        }
        if self.github.repo.trim().is_empty() {
            return Err(Error::config("repository name is missing", "repo"));
        }
        if url::Url::parse(&self.github.api_base).is_err() {
            return Err(Error::config(
                format!("invalid API base URL: {}", self.github.api_base),
                "api_base",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts must be at least 1",
                "retry.max_attempts",
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier must be at least 1.0",
                "retry.backoff_multiplier",
            ));
        }
        if self.polling.max_poll_attempts == 0 {
            return Err(Error::config(
                "polling.max_poll_attempts must be at least 1",
                "polling.max_poll_attempts",
            ));
        }
        if self.polling.runs_per_page == 0 || self.polling.runs_per_page > 100 {
            return Err(Error::config(
                "polling.runs_per_page must be between 1 and 100",
                "polling.runs_per_page",
            ));
        }
        Ok(())
    }
}

fn require_env(var: &str, key: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::config(format!("{var} is not set"), key)),
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_user_agent() -> String {
    concat!("actions-bridge/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_path_prefix() -> String {
    "python-files".to_string()
}

fn default_upload_message() -> String {
    "Upload {name} via actions-bridge".to_string()
}

fn default_delete_message() -> String {
    "Remove {name} after build".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_max_poll_attempts() -> u32 {
    10
}

fn default_runs_per_page() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Retry delays are short enough that milliseconds matter
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
