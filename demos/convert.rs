//! Build a local script with the repository's workflow
//!
//! This example demonstrates the full submission flow:
//! - Loading credentials from the environment (or `.env`)
//! - Checking token and repository access
//! - Subscribing to job events
//! - Uploading, waiting for the workflow run, and downloading its artifacts
//!
//! ```bash
//! GITHUB_TOKEN=... GITHUB_USERNAME=octo GITHUB_REPO=tools \
//!     cargo run --example convert -- script.py
//! ```
//!
//! Artifacts are written to the current directory as `<artifact name>.zip`.
//! Ctrl+C cancels the submission.

use actions_bridge::{
    Config, GitHubClient, JobEvent, JobPhase, Orchestrator, SourceFile, run_until_signal,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: convert <script.py>")?;
    let name = Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("path has no file name")?
        .to_string();
    let content = tokio::fs::read(&path).await?;

    dotenvy::dotenv().ok();
    let client = GitHubClient::new(Config::from_env()?)?;

    let report = client.check_access().await?;
    println!(
        "Authenticated as {} on {} (push: {})",
        report.login, report.repository, report.can_push
    );

    let orchestrator = Orchestrator::for_client(client);

    let mut events = orchestrator.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                JobEvent::PhaseChanged { to, .. } => println!("-> {to}"),
                JobEvent::Uploaded { commit } => println!("Uploaded {}", commit.path),
                JobEvent::RunDiscovered { run_id, .. } => println!("Watching run {run_id}"),
                JobEvent::StatusChecked {
                    status,
                    attempt,
                    max_attempts,
                    ..
                } => println!("[{attempt}/{max_attempts}] {status}"),
                JobEvent::ArtifactsReady { artifacts, .. } => {
                    println!("{} artifact(s) ready", artifacts.len())
                }
                JobEvent::SourceDeleted { path } => println!("Removed {path}"),
                JobEvent::CleanupFailed { error } => println!("Cleanup failed: {}", error.message),
                JobEvent::Failed { error } => println!("Failed: {}", error.message),
            }
        }
    });

    orchestrator
        .select_file(Some(SourceFile::new(name, content)))
        .await;
    orchestrator.start().await?;

    let snapshot = run_until_signal(&orchestrator).await;
    if snapshot.phase != JobPhase::Completed {
        let message = snapshot
            .failure
            .map(|f| f.message)
            .unwrap_or_else(|| format!("stopped in phase {}", snapshot.phase));
        return Err(message.into());
    }

    if snapshot.artifacts.is_empty() {
        println!("The workflow succeeded but produced no artifacts");
    }
    for artifact in &snapshot.artifacts {
        let bytes = orchestrator.download_artifact(artifact.id).await?;
        let target = format!("{}.zip", artifact.name);
        tokio::fs::write(&target, &bytes).await?;
        println!("Saved {target} ({} bytes)", bytes.len());
    }

    Ok(())
}
