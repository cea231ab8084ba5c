//! [`WorkflowError`]: the failure taxonomy surfaced by the C5 runtime.

use agent_memory::Kind;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("workflow execution {0} not found")]
    NotFound(uuid::Uuid),

    #[error("replay observed a divergent history: {0}")]
    DeterminismViolation(String),

    #[error("activity failed: {0}")]
    ActivityFailed(String),

    #[error("invalid schedule expression: {0}")]
    InvalidSchedule(String),

    #[error("workflow cancelled")]
    Cancelled,

    #[error("workflow execution exceeded its workflow_execution_timeout")]
    TimedOut,

    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            WorkflowError::NotFound(_) => Kind::NotFound,
            WorkflowError::DeterminismViolation(_) => Kind::DeterminismViolation,
            WorkflowError::ActivityFailed(_) | WorkflowError::InvalidSchedule(_) => Kind::Transient,
            WorkflowError::Cancelled => Kind::Internal,
            WorkflowError::TimedOut => Kind::Timeout,
            WorkflowError::Internal(_) => Kind::Internal,
        }
    }

    /// Whether this failure reflects a transient backend condition the
    /// runtime itself caused, as opposed to a caller-requested outcome
    /// (cancellation) or a structural error (not found, determinism).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), Kind::Transient | Kind::Timeout | Kind::RateLimited)
    }
}
