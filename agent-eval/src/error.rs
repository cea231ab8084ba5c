//! Error taxonomy for the evaluation harness.

use agent_memory::Kind;

/// Top-level error type for `agent-eval`.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("dataset parse error: {0}")]
    DatasetParse(String),

    #[error("subject failed on case `{case_id}`: {source}")]
    SubjectFailed { case_id: String, source: Box<dyn std::error::Error + Send + Sync> },

    #[error("internal error: {0}")]
    Internal(String),
}

impl EvalError {
    /// Maps this error onto the shared taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            EvalError::DatasetParse(_) => Kind::SchemaViolation,
            EvalError::SubjectFailed { .. } => Kind::Internal,
            EvalError::Internal(_) => Kind::Internal,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvalError>;
