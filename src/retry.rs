// src/retry.rs
//! Fixed-delay retry policy shared by every blocking external call
//! (feed fetch, summarization, webhook delivery).

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Attempts used for the feed fetch when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between two attempts. Fixed: no backoff growth, no jitter.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl RetryPolicy {
    /// `max_attempts` < 1 is treated as 1 (the call is always made once).
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Single attempt, never retried.
    pub fn once() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds, the error is not retryable, or attempts run out.
    /// The last error is returned on exhaustion.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        label: &str,
        mut op: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if self.max_attempts > 1 {
                info!(op = label, attempt, max = self.max_attempts, "calling upstream");
            } else {
                debug!(op = label, "calling upstream");
            }

            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    let retry = attempt < self.max_attempts && is_retryable(&e);
                    warn!(
                        op = label,
                        attempt,
                        max = self.max_attempts,
                        will_retry = retry,
                        error = %e,
                        "attempt failed"
                    );
                    if !retry {
                        return Err(e);
                    }
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
