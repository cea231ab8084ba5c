//! [`GraphCapabilities`]: the dependency-injected seam between graph nodes
//! and the outside world (memory, LLM completion, vision). Nodes take
//! `Arc<dyn GraphCapabilities>` rather than reaching for global state, so a
//! compiled graph can be invoked against fakes in tests and against real
//! backends in production with no code change.

use agent_memory::{FilterExpr, Payload, ScoredDocument};
use async_trait::async_trait;

/// Options accepted by [`GraphCapabilities::llm_complete`].
#[derive(Debug, Clone)]
pub struct LlmOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self { temperature: 0.0, max_tokens: 1024 }
    }
}

/// An LLM completion result.
#[derive(Debug, Clone)]
pub struct LlmCompletion {
    pub text: String,
    pub model: String,
}

/// Collaborators a graph node may call into. Implemented once against real
/// backends (memory layer, LLM client) and once against deterministic
/// fakes for tests.
#[async_trait]
pub trait GraphCapabilities: Send + Sync {
    /// Semantic search against the memory layer (wraps `Memory::search`).
    async fn memory_search(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>, CapabilityError>;

    /// Saves content to the memory layer (wraps `Memory::save`).
    async fn memory_save(
        &self,
        collection: &str,
        content: &str,
        metadata: Payload,
    ) -> Result<u64, CapabilityError>;

    /// A single-turn LLM completion over `prompt`.
    async fn llm_complete(
        &self,
        prompt: &str,
        options: LlmOptions,
    ) -> Result<LlmCompletion, CapabilityError>;

    /// Describes the contents of an image, for caption/quality nodes that
    /// need to reason about social-post media.
    async fn describe_image(&self, image_url: &str) -> Result<String, CapabilityError>;
}

/// A collaborator call failed. Carries enough context for a node to decide
/// whether to retry or surface [`crate::error::GraphError::Collaborator`].
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl From<agent_memory::MemoryError> for CapabilityError {
    fn from(err: agent_memory::MemoryError) -> Self {
        CapabilityError(err.to_string())
    }
}
