//! Retry policy for network calls
//!
//! One policy object wraps any fallible async operation: a bounded number
//! of attempts, a fixed pause between them, and a predicate deciding which
//! errors are worth another attempt.

use crate::error::{FloraIdError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    retryable: fn(&FloraIdError) -> bool,
}

impl RetryPolicy {
    /// Retries transient failures only (see `FloraIdError::is_transient`)
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable: FloraIdError::is_transient,
        }
    }

    /// Single attempt, no pause
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_condition(mut self, retryable: fn(&FloraIdError) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is_retryable(&self, error: &FloraIdError) -> bool {
        (self.retryable)(error)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up. The last error is returned.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && self.is_retryable(&e) => {
                    warn!(
                        "network attempt {}/{} for '{}' failed: {}; retrying in {:?}",
                        attempt, self.max_attempts, label, e, self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("'{}' gave up after {} attempt(s): {}", label, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// Same as `run` but turns the final failure into `None`
    pub async fn run_soft<T, F, Fut>(&self, label: &str, op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run(label, op).await.ok()
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}
