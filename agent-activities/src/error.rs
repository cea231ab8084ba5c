//! [`ActivityError`]: the failure taxonomy activities surface to the
//! workflow runtime, which decides retry/non-retry by kind rather than by
//! matching on concrete variants.

use agent_memory::Kind;

/// An activity's failure, classified for the workflow runtime's retry
/// policy.
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("non-retryable failure: {0}")]
    Permanent(String),

    #[error("activity exceeded its deadline")]
    Timeout,

    #[error("activity cancelled")]
    Cancelled,
}

impl ActivityError {
    /// Maps this error onto the shared taxonomy kind, the same one
    /// `agent-memory` and `agent-graph` report through, so a single retry
    /// policy can reason about errors from every layer uniformly.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            ActivityError::Transient(_) => Kind::Transient,
            ActivityError::Permanent(_) => Kind::SchemaViolation,
            ActivityError::Timeout => Kind::Timeout,
            ActivityError::Cancelled => Kind::Internal,
        }
    }
}

impl From<agent_memory::MemoryError> for ActivityError {
    fn from(err: agent_memory::MemoryError) -> Self {
        if err.is_retryable() {
            ActivityError::Transient(err.to_string())
        } else {
            ActivityError::Permanent(err.to_string())
        }
    }
}

impl From<agent_graph::GraphError> for ActivityError {
    fn from(err: agent_graph::GraphError) -> Self {
        ActivityError::Permanent(err.to_string())
    }
}
