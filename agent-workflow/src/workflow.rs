//! [`Workflow`]: the trait a durable workflow body implements. Generalizes
//! the reference `durable::workflow::Workflow` trait (typed input/output,
//! a `run` entry point) to this crate's event-sourced replay model.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::WorkflowContext;
use crate::error::WorkflowError;

/// A durable workflow body. `run` must be deterministic given the same
/// sequence of [`WorkflowContext`] call results — all non-determinism
/// (clock reads, random draws, activity calls) must go through `ctx`.
#[async_trait]
pub trait Workflow: Send + Sync {
    type Input: Serialize + DeserializeOwned + Send + Sync + Clone;
    type Output: Serialize + DeserializeOwned + Send;

    /// Stable type name used to route `StartWorkflow` calls and label
    /// executions in the store.
    fn workflow_type() -> &'static str
    where
        Self: Sized;

    /// # Errors
    /// Returns [`WorkflowError::ActivityFailed`] if a scheduled activity's
    /// retry policy is exhausted, or [`WorkflowError::Cancelled`] if the
    /// workflow observes `ctx.is_cancelled()` and chooses to stop.
    async fn run(&self, ctx: &mut WorkflowContext, input: Self::Input) -> Result<Self::Output, WorkflowError>;
}
