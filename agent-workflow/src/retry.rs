//! [`ActivityRetryPolicy`]: generalizes `agent_memory::retry::RetryPolicy`
//! (same backoff shape) with a per-[`Kind`] retry allowlist, so a workflow
//! can declare e.g. "never retry a schema violation" without matching on
//! concrete activity error types.

use std::collections::HashSet;
use std::future::Future;

use agent_activities::ActivityError;
use agent_memory::retry::RetryPolicy;
use agent_memory::Kind;

/// Retry policy for activities scheduled from a workflow body.
#[derive(Debug, Clone)]
pub struct ActivityRetryPolicy {
    pub backoff: RetryPolicy,
    /// Error kinds that must never be retried, regardless of attempts
    /// remaining (e.g. `Kind::SchemaViolation`).
    pub non_retryable_kinds: HashSet<Kind>,
}

impl Default for ActivityRetryPolicy {
    fn default() -> Self {
        Self {
            backoff: RetryPolicy::activity_default(),
            non_retryable_kinds: HashSet::from([Kind::SchemaViolation, Kind::NotFound]),
        }
    }
}

impl ActivityRetryPolicy {
    #[must_use]
    pub fn is_retryable(&self, err: &ActivityError) -> bool {
        !self.non_retryable_kinds.contains(&err.kind())
    }

    pub async fn run<T, F, Fut>(
        &self,
        op: F,
        is_retryable: impl Fn(&ActivityError) -> bool,
    ) -> Result<T, ActivityError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ActivityError>>,
    {
        self.backoff.run(op, is_retryable).await
    }
}
