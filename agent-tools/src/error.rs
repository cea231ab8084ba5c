//! [`ToolsError`]: the HTTP-facing error taxonomy for the status/trigger
//! surface and the JSON-RPC tool interface. Wraps the lower layers' [`agent_memory::Kind`] so every crate's
//! failures map onto the same five HTTP statuses.

use agent_memory::Kind;
use agent_workflow::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited, retry with backoff")]
    RateLimited,

    #[error("downstream unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolsError {
    /// The HTTP status spec §6's error-code table assigns this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ToolsError::BadRequest(_) => 400,
            ToolsError::NotFound(_) => 404,
            ToolsError::Conflict(_) => 409,
            ToolsError::RateLimited => 429,
            ToolsError::Internal(_) => 500,
            ToolsError::Unavailable(_) => 503,
        }
    }
}

impl From<WorkflowError> for ToolsError {
    fn from(err: WorkflowError) -> Self {
        match err.kind() {
            Kind::SchemaViolation => ToolsError::BadRequest(err.to_string()),
            Kind::NotFound => ToolsError::NotFound(err.to_string()),
            Kind::Transient | Kind::Timeout => ToolsError::Unavailable(err.to_string()),
            Kind::RateLimited => ToolsError::RateLimited,
            Kind::DeterminismViolation | Kind::Internal => ToolsError::Internal(err.to_string()),
        }
    }
}

impl From<agent_memory::MemoryError> for ToolsError {
    fn from(err: agent_memory::MemoryError) -> Self {
        match err.kind() {
            Kind::SchemaViolation => ToolsError::BadRequest(err.to_string()),
            Kind::NotFound => ToolsError::NotFound(err.to_string()),
            Kind::Transient | Kind::Timeout => ToolsError::Unavailable(err.to_string()),
            Kind::RateLimited => ToolsError::RateLimited,
            Kind::DeterminismViolation | Kind::Internal => ToolsError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_429() {
        assert_eq!(ToolsError::RateLimited.status_code(), 429);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(ToolsError::NotFound("workflow".to_string()).status_code(), 404);
    }
}
