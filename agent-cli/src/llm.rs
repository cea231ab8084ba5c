//! [`NullLlmClient`]: the default [`LlmClient`](agent_graph::LlmClient) this
//! CLI wires up when no LLM collaborator is configured. The LLM interface is
//! out of this workspace's scope; an operator plugging in a real
//! model swaps this for their own `LlmClient` impl without touching
//! `agent-graph`.

use agent_graph::{CapabilityError, LlmClient, LlmCompletion, LlmOptions};
use async_trait::async_trait;

/// Always fails with a descriptive error, so a feed-publisher run degrades
/// the same way it would against an unreachable real provider: the graph
/// records a warning and still reaches `save_memory` rather than panicking.
pub struct NullLlmClient;

#[async_trait]
impl LlmClient for NullLlmClient {
    async fn complete(&self, _prompt: &str, _options: LlmOptions) -> Result<LlmCompletion, CapabilityError> {
        Err(CapabilityError("no LLM client configured; pass one to RuntimeContext::bootstrap".to_string()))
    }

    async fn describe_image(&self, _image_url: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError("no LLM client configured; pass one to RuntimeContext::bootstrap".to_string()))
    }
}
