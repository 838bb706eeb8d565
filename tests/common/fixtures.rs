//! Provider response fixtures and mock mounting helpers

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Repository prefix of every repository endpoint on the mock server
pub const REPO_PATH: &str = "/repos/octo/tools";

/// Contents API path of an uploaded source file
pub fn source_path(name: &str) -> String {
    format!("{REPO_PATH}/contents/python-files/{name}")
}

/// Workflow run as returned by the runs endpoints
pub fn run_json(id: u64, status: &str, conclusion: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": "Build executable",
        "status": status,
        "conclusion": conclusion,
        "created_at": "2024-05-01T12:00:00Z",
        "head_sha": "5d1c2a",
        "event": "push",
        "html_url": format!("https://github.com/octo/tools/actions/runs/{id}")
    })
}

/// Artifact as returned by the artifacts endpoints
pub fn artifact_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "expired": false,
        "size_in_bytes": 2048,
        "expires_at": "2024-08-01T12:00:00Z"
    })
}

/// Mount the contents endpoints for one upload followed by one delete
///
/// The file is absent before the upload and present afterwards.
pub async fn mount_upload_and_delete(server: &MockServer, name: &str) {
    let file = source_path(name);
    Mock::given(method("GET"))
        .and(path(file.clone()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(file.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "path": format!("python-files/{name}"),
            "sha": "blob-1"
        })))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path(file.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"path": format!("python-files/{name}"), "sha": "blob-1"},
            "commit": {"sha": "commit-1"}
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(file))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": null,
            "commit": {"sha": "commit-2"}
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount run discovery returning `run_id` as the newest run
pub async fn mount_latest_run(server: &MockServer, run_id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{REPO_PATH}/actions/runs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "workflow_runs": [run_json(run_id, "queued", None)]
        })))
        .expect(1)
        .mount(server)
        .await;
}
