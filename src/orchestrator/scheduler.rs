//! Delay source for the job driver
//!
//! The driver never sleeps directly; it asks a [`Scheduler`]. Production code
//! uses [`TokioScheduler`], tests substitute one that records delays and
//! returns immediately.

use async_trait::async_trait;
use std::time::Duration;

/// Waits between ticks
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Suspend for `delay`
    async fn sleep(&self, delay: Duration);
}

/// [`Scheduler`] backed by `tokio::time::sleep`
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
