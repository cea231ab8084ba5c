//! The [`Activity`] trait: a typed, idempotent unit of work a workflow can
//! schedule. Generalizes the reference `durable::Activity`
//! trait shape (input/output associated types, context-carrying `run`).

use async_trait::async_trait;

use crate::context::ActivityContext;
use crate::error::ActivityError;

/// A single unit of work a [`crate::workflow`]... (wired by `agent-workflow`)
/// can schedule. Implementors should be deterministic given the same input
/// and idempotent under retry with the same `ActivityContext::idempotency_key`.
#[async_trait]
pub trait Activity: Send + Sync {
    type Input: Send;
    type Output: Send;

    /// Stable name used to route scheduled work to this activity and to
    /// label its entries in the workflow event log.
    fn activity_type(&self) -> &'static str;

    /// # Errors
    /// Returns [`ActivityError::Transient`] for failures the caller should
    /// retry, and [`ActivityError::Permanent`] for failures it should not.
    async fn run(&self, ctx: &ActivityContext, input: Self::Input) -> Result<Self::Output, ActivityError>;
}
