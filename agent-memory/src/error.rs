//! Error taxonomy for the memory layer.
//!
//! Every fallible operation in this crate returns [`MemoryError`]. Backend
//! crates (`agent-memory-store-vector`, `agent-memory-store-cache`) define
//! their own `thiserror` enums and convert into this one at the boundary via
//! `From`, collapsing backend-specific failure modes into the shared [`Kind`]
//! taxonomy that the rest of the platform reasons about.

use std::fmt;

/// The shared error-kind taxonomy, reused (with `From` conversions) by every
/// other crate in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Input fails a declared contract (schema, bounds).
    SchemaViolation,
    /// A named entity does not exist.
    NotFound,
    /// An external dependency is temporarily unavailable; retry with backoff.
    Transient,
    /// An operation exceeded its deadline.
    Timeout,
    /// A provider signalled overload; retry with increased backoff.
    RateLimited,
    /// Workflow replay observed a divergent history.
    DeterminismViolation,
    /// An unexpected invariant broke.
    Internal,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::SchemaViolation => "schema_violation",
            Kind::NotFound => "not_found",
            Kind::Transient => "transient",
            Kind::Timeout => "timeout",
            Kind::RateLimited => "rate_limited",
            Kind::DeterminismViolation => "determinism_violation",
            Kind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Top-level error type for `agent-memory`.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("embedding provider unavailable: {0}")]
    EmbeddingFailed(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("operation timed out")]
    Timeout,

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited {
        /// Hint from the provider, if any.
        retry_after_ms: u64,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl MemoryError {
    /// Maps this error onto the shared taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            MemoryError::SchemaViolation(_) => Kind::SchemaViolation,
            MemoryError::NotFound(_) => Kind::NotFound,
            MemoryError::EmbeddingFailed(_) | MemoryError::StoreUnavailable(_) => Kind::Transient,
            MemoryError::Timeout => Kind::Timeout,
            MemoryError::RateLimited { .. } => Kind::RateLimited,
            MemoryError::Internal(_) => Kind::Internal,
        }
    }

    /// Whether a caller should retry this error under the standard retry
    /// policy (everything except schema/not-found/internal failures).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            Kind::Transient | Kind::Timeout | Kind::RateLimited
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MemoryError>;
