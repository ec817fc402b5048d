//! Bounded retry and polling for transient server conditions.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::error::{FossologyError, Result};

/// Exponential backoff with jitter, bounded by attempts and total wait.
///
/// Only errors for which [`FossologyError::is_retryable`] holds are retried.
/// When the policy gives up, the last underlying error is returned as is.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Upper bound for the time spent waiting across all attempts.
    pub max_wait: Duration,
    /// Add up to half of each delay as random jitter.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_wait: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Same policy with a different total wait budget.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Same policy with a different attempt cap.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Backoff delay before attempt `attempt + 1` (attempts are 1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let base = self
            .initial_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay);

        if !self.jitter || base.is_zero() {
            return base;
        }

        let half = u64::try_from(base.as_millis() / 2).unwrap_or(u64::MAX);
        let extra = rand::rng().random_range(0..=half);
        (base + Duration::from_millis(extra)).min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails terminally, or the policy
    /// is exhausted.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            let err = match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.max_attempts {
                return Err(err);
            }

            let delay = match &err {
                FossologyError::NotReady {
                    retry_after_secs: Some(secs),
                    ..
                } => Duration::from_secs(*secs),
                _ => self.delay_for(attempt),
            };

            if started.elapsed() + delay > self.max_wait {
                tracing::debug!(operation, attempt, "retry budget exhausted");
                return Err(err);
            }

            tracing::debug!(
                operation,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Fetch a value repeatedly until `done` accepts it or `timeout` elapses.
    ///
    /// Each fetch goes through [`RetryPolicy::run`] with its wait budget
    /// capped at the time left, so transient errors neither end the poll
    /// nor stretch it past `timeout`. Expiry yields [`FossologyError::Timeout`].
    pub async fn poll<T, F, Fut, D>(
        &self,
        operation: &str,
        timeout: Duration,
        mut fetch: F,
        done: D,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        D: Fn(&T) -> bool,
    {
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            let remaining = timeout.saturating_sub(started.elapsed());
            let budget = self.clone().with_max_wait(remaining);
            match budget.run(operation, &mut fetch).await {
                Ok(value) if done(&value) => return Ok(value),
                Ok(_) => tracing::debug!(operation, attempt, "not finished yet, polling again"),
                Err(err) if err.is_retryable() => {
                    tracing::debug!(operation, attempt, error = %err, "still unavailable");
                }
                Err(err) => return Err(err),
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(FossologyError::Timeout {
                    operation: operation.to_string(),
                    waited_secs: elapsed.as_secs(),
                });
            }

            tokio::time::sleep(self.delay_for(attempt).min(timeout - elapsed)).await;
            attempt += 1;
        }
    }
}
