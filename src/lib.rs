//! # actions-bridge
//!
//! Library for building source files with a repository's GitHub Actions workflow.
//!
//! A submission uploads a file to a repository, waits for the workflow run the
//! commit triggers, polls it until it concludes, and exposes the produced
//! artifacts for download. The uploaded file is removed again once the build
//! succeeds.
//!
//! ## Design Philosophy
//!
//! actions-bridge is designed to be:
//! - **Resilient** - Rate limits and transient network failures are retried with backoff
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to job events and read snapshots
//! - **Testable** - The state machine advances through an explicit `tick()` over a backend trait
//!
//! ## Quick Start
//!
//! ```no_run
//! use actions_bridge::{Config, GitHubClient, Orchestrator, SourceFile};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // GITHUB_TOKEN, GITHUB_USERNAME and GITHUB_REPO
//!     let config = Config::from_env()?;
//!     let client = GitHubClient::new(config)?;
//!     let orchestrator = Orchestrator::for_client(client);
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     orchestrator
//!         .select_file(Some(SourceFile::new("script.py", "print('hello')")))
//!         .await;
//!     orchestrator.start().await?;
//!
//!     let snapshot = orchestrator.run(CancellationToken::new()).await;
//!     for artifact in &snapshot.artifacts {
//!         let bytes = orchestrator.download_artifact(artifact.id).await?;
//!         println!("{}: {} bytes", artifact.name, bytes.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Repository operations consumed by the orchestrator
pub mod backend;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// GitHub REST client (decomposed into focused submodules)
pub mod github;
/// Resilient HTTP transport
pub mod http;
/// Submission state machine
pub mod orchestrator;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use backend::RepositoryBackend;
pub use config::{Config, GitHubConfig, PollingConfig, RetryConfig, UploadConfig};
pub use error::{Error, ErrorDetail, Result};
pub use github::GitHubClient;
pub use orchestrator::{
    JobEvent, JobPhase, JobSnapshot, Orchestrator, Scheduler, TickOutcome, TokioScheduler,
};
pub use types::{
    AccessReport, Artifact, ArtifactId, AutomationRun, CommitInfo, RemoteFile, RunConclusion,
    RunId, RunStatus, SourceFile,
};

use tokio_util::sync::CancellationToken;

/// Drive a started submission, cancelling it on a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// A signal marks the job failed with a `cancelled` error; the uploaded file
/// and the workflow run are left as they are.
///
/// # Example
///
/// ```no_run
/// use actions_bridge::{Config, GitHubClient, Orchestrator, SourceFile, run_until_signal};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let orchestrator = Orchestrator::for_client(GitHubClient::new(Config::from_env()?)?);
///     orchestrator
///         .select_file(Some(SourceFile::new("script.py", "print(1)")))
///         .await;
///     orchestrator.start().await?;
///
///     let snapshot = run_until_signal(&orchestrator).await;
///     println!("{:?}", snapshot.phase);
///     Ok(())
/// }
/// ```
pub async fn run_until_signal(orchestrator: &Orchestrator) -> JobSnapshot {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    let snapshot = orchestrator.run(cancel).await;
    watcher.abort();
    snapshot
}

/// Resolves on Ctrl+C, or SIGTERM on unix
///
/// A listener that cannot be installed never resolves.
async fn wait_for_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c listener unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM listener unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!(signal = "interrupt", "cancelling submission"),
        _ = terminate => tracing::info!(signal = "terminate", "cancelling submission"),
    }
}
