//! Bounded retry with exponential backoff
//!
//! The schedule is deliberately plain: attempt 1 runs immediately, each
//! following attempt waits twice as long as the previous one, and after the
//! attempt cap the last failure is propagated unchanged. No jitter, no
//! failure-kind discrimination. Downstream timing-sensitive behavior depends
//! on this exact doubling schedule.

use crate::errors::{AppError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry policy applied to fallible asynchronous operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, counting the first call
    max_attempts: u32,
    /// Wait before the second attempt; doubles for each attempt after
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Execute `operation` until it succeeds or the attempt cap is reached
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.initial_delay;
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                sleep(delay).await;
                delay *= 2;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "operation failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Internal {
            message: "retry policy allowed no attempts".to_string(),
        }))
    }
}
