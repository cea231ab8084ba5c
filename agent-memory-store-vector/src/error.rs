//! Backend-specific error type, converted into `agent_memory::MemoryError` at
//! the boundary.

use agent_memory::MemoryError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("dimension mismatch: collection `{collection}` expects {expected}, got {actual}")]
    DimensionMismatch { collection: String, expected: usize, actual: usize },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for MemoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DimensionMismatch { .. } => MemoryError::SchemaViolation(err.to_string()),
            StoreError::Unavailable(msg) => MemoryError::StoreUnavailable(msg),
            StoreError::Corrupt(msg) => MemoryError::Internal(msg),
        }
    }
}
