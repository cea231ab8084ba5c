//! Exponential backoff with jitter, shared by the embedding provider and
//! reused (in shape) by `agent-workflow`'s per-activity retry policy.

use rand::Rng;
use std::time::Duration;

/// Backoff policy for retryable operations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_coefficient: f64,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            max_interval: Duration::from_secs(60),
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// The embedding provider's 5-attempt policy (spec 4.1).
    #[must_use]
    pub fn embedding_default() -> Self {
        Self::default()
    }

    /// The workflow runtime's activity-default policy (spec 4.5): 1s
    /// initial, 2x backoff, 60s cap, 3 attempts.
    #[must_use]
    pub fn activity_default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            max_interval: Duration::from_secs(60),
            max_attempts: 3,
        }
    }

    /// Delay before the `attempt`-th retry (1-indexed: `attempt == 1` is the
    /// delay between the first and second tries), with +/-20% jitter.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.backoff_coefficient.powi(attempt.saturating_sub(1) as i32);
        let base_ms = (self.initial_interval.as_millis() as f64 * exp)
            .min(self.max_interval.as_millis() as f64);
        let mut rng = rand::rng();
        let jitter = rng.random_range(0.8..1.2);
        Duration::from_millis((base_ms * jitter) as u64)
    }

    /// Runs `op`, retrying on errors for which `is_retryable` returns true,
    /// up to `max_attempts` total attempts. Sleeps between attempts using
    /// the computed backoff delay.
    pub async fn run<T, E, F, Fut>(&self, mut op: F, is_retryable: impl Fn(&E) -> bool) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(attempt, ?delay, "retrying after transient error");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_with_attempt_and_respects_cap() {
        let policy = RetryPolicy::default();
        let d1 = policy.delay_for_attempt(1);
        let d5 = policy.delay_for_attempt(10);
        assert!(d1.as_millis() <= policy.max_interval.as_millis());
        assert!(d5.as_millis() <= policy.max_interval.as_millis() + policy.max_interval.as_millis() / 5);
    }

    #[tokio::test]
    async fn run_retries_until_success() {
        let policy = RetryPolicy {
            initial_interval: Duration::from_millis(1),
            backoff_coefficient: 1.0,
            max_interval: Duration::from_millis(2),
            max_attempts: 3,
        };
        let mut calls = 0;
        let result: Result<u32, &str> = policy
            .run(
                || {
                    calls += 1;
                    let calls = calls;
                    async move {
                        if calls < 3 {
                            Err("transient")
                        } else {
                            Ok(42)
                        }
                    }
                },
                |_| true,
            )
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls, 3);
    }
}
