//! Retry logic with exponential backoff
//!
//! This module provides configurable retry logic for transient failures.
//! Delays grow exponentially from `initial_delay`, are capped at `max_delay`, and
//! can optionally be jittered. An error may carry its own server-supplied delay
//! (e.g., a `Retry-After` header), which then replaces the computed backoff.
//!
//! # Example
//!
//! ```no_run
//! use actions_bridge::retry::{IsRetryable, with_retry};
//! use actions_bridge::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let result = with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (rate limiting, timeouts, connection resets) should return `true`.
/// Permanent failures (bad credentials, missing resources, malformed bodies) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;

    /// Server-mandated delay before the next attempt, if the error carries one
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimited { .. } => true,
            Error::Network(e) => {
                // Body/decode errors mean the server answered; only transport failures are transient
                e.is_timeout() || e.is_connect() || e.is_request()
            }
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// # Arguments
///
/// * `config` - Retry configuration (total attempts, delays, backoff multiplier, jitter)
/// * `operation` - Async closure that returns Result<T, E> where E implements IsRetryable
///
/// # Returns
///
/// Returns the successful result, the first non-retryable error, or the error of
/// the final attempt once `config.max_attempts` attempts have been made. No delay
/// is inserted after the final attempt.
///
/// A server-supplied delay replaces the computed backoff and is waited out in
/// full. If it exceeds `config.max_delay` the error is returned right away.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let wait = match e.retry_after() {
                    Some(server_delay) if server_delay > config.max_delay => {
                        tracing::warn!(
                            error = %e,
                            attempts = attempt,
                            retry_after_secs = server_delay.as_secs(),
                            max_delay_ms = config.max_delay.as_millis(),
                            "Server asked to wait longer than the retry ceiling, giving up"
                        );
                        return Err(e);
                    }
                    Some(server_delay) => server_delay,
                    None if config.jitter => add_jitter(delay),
                    None => delay,
                };

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = wait.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::time::sleep(wait).await;

                attempt += 1;
                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::debug!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay,
/// so the actual delay lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        Transient,
        Throttled(Duration),
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Throttled(d) => write!(f, "throttled for {d:?}"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            !matches!(self, TestError::Permanent)
        }

        fn retry_after(&self) -> Option<Duration> {
            match self {
                TestError::Throttled(d) => Some(*d),
                _ => None,
            }
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn test_retry_transient_then_succeed() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempt_bound_counts_first_call() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Transient)));
        assert_eq!(
            counter.load(Ordering::SeqCst),
            3,
            "max_attempts is the total number of calls"
        );
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(3), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backoff_delays_increase_exponentially() {
        let config = RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();

        let _result = with_retry(&config, || {
            let ts = ts_clone.clone();
            async move {
                ts.lock().await.push(std::time::Instant::now());
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 4);

        let gap1 = ts[1].duration_since(ts[0]);
        let gap2 = ts[2].duration_since(ts[1]);
        let gap3 = ts[3].duration_since(ts[2]);

        assert!(gap1 >= Duration::from_millis(40), "first delay ~50ms, was {gap1:?}");
        assert!(gap2 >= Duration::from_millis(80), "second delay ~100ms, was {gap2:?}");
        assert!(gap3 >= Duration::from_millis(160), "third delay ~200ms, was {gap3:?}");
    }

    #[tokio::test]
    async fn server_delay_replaces_backoff() {
        let config = RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let start = std::time::Instant::now();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TestError::Throttled(Duration::from_millis(20)))
                } else {
                    Ok(1)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "server delay of 20ms should be used instead of the 5s backoff"
        );
    }

    #[tokio::test]
    async fn server_delay_is_waited_in_full() {
        let config = RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let start = std::time::Instant::now();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(TestError::Throttled(Duration::from_millis(150)))
                } else {
                    Ok(1)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert!(
            start.elapsed() >= Duration::from_millis(140),
            "server delay was cut short: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn server_delay_beyond_max_delay_gives_up_immediately() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(30),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let start = std::time::Instant::now();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&config, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Throttled(Duration::from_secs(3600)))
            }
        })
        .await;

        assert!(matches!(result, Err(TestError::Throttled(d)) if d == Duration::from_secs(3600)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn no_delay_after_final_attempt() {
        let config = RetryConfig {
            max_attempts: 1,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        };

        let start = std::time::Instant::now();
        let result = with_retry(&config, || async { Err::<i32, _>(TestError::Transient) }).await;

        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn add_jitter_stays_within_bounds_over_many_iterations() {
        let delay = Duration::from_millis(50);
        for i in 0..200 {
            let jittered = add_jitter(delay);
            assert!(jittered >= delay, "iteration {i}: {jittered:?} < {delay:?}");
            assert!(jittered <= delay * 2, "iteration {i}: {jittered:?} > 2x");
        }
    }

    #[test]
    fn add_jitter_on_zero_delay_returns_zero() {
        assert_eq!(add_jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn rate_limited_is_retryable_with_server_delay() {
        let err = Error::RateLimited {
            status: 429,
            retry_after: Some(Duration::from_secs(2)),
        };
        assert!(err.is_retryable());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn provider_classifications_are_not_retryable() {
        assert!(!Error::Unauthorized("bad".into()).is_retryable());
        assert!(!Error::Forbidden("scope".into()).is_retryable());
        assert!(!Error::NotFound("gone".into()).is_retryable());
        assert!(!Error::Conflict("sha".into()).is_retryable());
        assert!(
            !Error::Api {
                status: 500,
                message: "boom".into()
            }
            .is_retryable()
        );
        assert!(!Error::RetriesExhausted { attempts: 3 }.is_retryable());
        assert!(
            !Error::ArtifactExpired {
                id: crate::types::ArtifactId(1)
            }
            .is_retryable()
        );
    }

    // reqwest::Error has no public constructor; network retryability is covered
    // against a closed port in the http module tests
}
