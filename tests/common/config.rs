//! Test configuration helpers for loading .env credentials and building clients

use actions_bridge::{Config, GitHubClient, GitHubConfig, PollingConfig, RetryConfig};
use std::time::Duration;

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Whether `.env` (or the environment) provides live GitHub credentials
pub fn has_live_credentials() -> bool {
    dotenvy::dotenv().ok();
    ["GITHUB_TOKEN", "GITHUB_USERNAME", "GITHUB_REPO"]
        .iter()
        .all(|key| std::env::var(key).is_ok_and(|v| !v.trim().is_empty()))
}

/// Load the live configuration from environment variables
///
/// Required environment variables:
/// - `GITHUB_TOKEN` - Token with `repo` and `workflow` scope
/// - `GITHUB_USERNAME` - Repository owner
/// - `GITHUB_REPO` - Repository with a workflow that builds `python-files/`
pub fn load_live_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env().map_err(|e| ConfigError(e.to_string()))
}

/// Create a client against the real API
pub fn create_live_client() -> Result<GitHubClient, ConfigError> {
    let config = load_live_config()?;
    GitHubClient::new(config).map_err(|e| ConfigError(format!("Failed to create client: {}", e)))
}

/// Create a client against the real API with an invalid token
pub fn create_client_bad_token() -> Result<GitHubClient, ConfigError> {
    let mut config = load_live_config()?;
    config.github.token = "ghp_invalid_token_12345".to_string();
    GitHubClient::new(config).map_err(|e| ConfigError(format!("Failed to create client: {}", e)))
}

/// Configuration pointed at a mock server, with fast retries and no polling delays
pub fn mock_config(api_base: &str) -> Config {
    Config {
        github: GitHubConfig {
            token: "test-token".to_string(),
            owner: "octo".to_string(),
            repo: "tools".to_string(),
            api_base: api_base.to_string(),
            ..Default::default()
        },
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        polling: PollingConfig {
            settle_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            ..Default::default()
        },
        ..Default::default()
    }
}
