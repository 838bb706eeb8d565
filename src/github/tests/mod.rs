//! Wiremock-backed tests for the GitHub client


use super::GitHubClient;
use crate::config::{Config, GitHubConfig, RetryConfig};
use std::time::Duration;
use wiremock::MockServer;

pub(super) const REPO_PATH: &str = "/repos/octo/tools";

/// Client pointed at a mock server with fast retries
pub(super) fn client_for(server: &MockServer) -> GitHubClient {
    let config = Config {
        github: GitHubConfig {
            token: "test-token".into(),
            owner: "octo".into(),
            repo: "tools".into(),
            api_base: server.uri(),
            ..Default::default()
        },
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        ..Default::default()
    };
    GitHubClient::new(config).unwrap()
}

pub(super) fn contents_path(file: &str) -> String {
    format!("{REPO_PATH}/contents/python-files/{file}")
}

pub(super) fn put_response(path: &str, sha: &str) -> serde_json::Value {
    serde_json::json!({
        "content": {"name": path.rsplit('/').next(), "path": path, "sha": sha},
        "commit": {"sha": format!("commit-{sha}")}
    })
}

#[test]
fn contents_url_encodes_segments() {
    let config = Config {
        github: GitHubConfig {
            token: "t".into(),
            owner: "octo".into(),
            repo: "tools".into(),
            api_base: "https://api.example.com/".into(),
            ..Default::default()
        },
        ..Default::default()
    };
    let client = GitHubClient::new(config).unwrap();

    assert_eq!(
        client.contents_url("python-files/my script.py"),
        "https://api.example.com/repos/octo/tools/contents/python-files/my%20script.py"
    );
    assert_eq!(
        client.repo_url("/actions/runs/42"),
        "https://api.example.com/repos/octo/tools/actions/runs/42"
    );
    assert_eq!(client.api_url("/user"), "https://api.example.com/user");
}

#[test]
fn new_rejects_incomplete_config() {
    let result = GitHubClient::new(Config::default());
    assert!(matches!(result, Err(crate::Error::Config { .. })));
}
