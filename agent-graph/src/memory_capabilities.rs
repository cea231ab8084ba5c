//! [`MemoryGraphCapabilities`]: the production [`GraphCapabilities`]
//! implementation, wiring `memory_search`/`memory_save` straight onto an
//! [`agent_memory::Memory`] handle and `llm_complete`/`describe_image` onto
//! an injected [`LlmClient`] (spec §4.3: "capabilities available to nodes
//! (dependency-injected, not globals)"). The LLM itself is out of scope
//!; `LlmClient` is
//! the narrow trait that interface is specified at, so production code can
//! plug in a real client and tests can plug in a scripted fake without
//! either touching graph-node code.

use std::sync::Arc;

use agent_memory::{FilterExpr, Memory, Payload, ScoredDocument};
use async_trait::async_trait;

use crate::capabilities::{CapabilityError, GraphCapabilities, LlmCompletion, LlmOptions};

/// A single-turn completion client, the one seam this workspace defines for
/// the external LLM collaborator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str, options: LlmOptions) -> Result<LlmCompletion, CapabilityError>;

    /// Produces a text description of an image at `image_url`, for the
    /// Feed Publisher graph's `describe_image` node.
    async fn describe_image(&self, image_url: &str) -> Result<String, CapabilityError>;
}

/// Wires [`Memory`] and an [`LlmClient`] into one [`GraphCapabilities`]
/// implementation, the shape every production graph run uses.
pub struct MemoryGraphCapabilities {
    memory: Arc<Memory>,
    llm: Arc<dyn LlmClient>,
}

impl MemoryGraphCapabilities {
    #[must_use]
    pub fn new(memory: Arc<Memory>, llm: Arc<dyn LlmClient>) -> Self {
        Self { memory, llm }
    }
}

#[async_trait]
impl GraphCapabilities for MemoryGraphCapabilities {
    async fn memory_search(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>, CapabilityError> {
        self.memory.search(collection, query, top_k, filter).await.map_err(CapabilityError::from)
    }

    async fn memory_save(
        &self,
        collection: &str,
        content: &str,
        metadata: Payload,
    ) -> Result<u64, CapabilityError> {
        self.memory.save(collection, content, metadata).await.map_err(CapabilityError::from)
    }

    async fn llm_complete(&self, prompt: &str, options: LlmOptions) -> Result<LlmCompletion, CapabilityError> {
        self.llm.complete(prompt, options).await
    }

    async fn describe_image(&self, image_url: &str) -> Result<String, CapabilityError> {
        self.llm.describe_image(image_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_memory::embeddings::DeterministicEmbeddingProvider;
    use agent_memory::MemoryConfig;
    use agent_memory_store_cache::InMemoryCacheStore;
    use agent_memory_store_vector::InMemoryVectorStore;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, prompt: &str, _options: LlmOptions) -> Result<LlmCompletion, CapabilityError> {
            Ok(LlmCompletion { text: prompt.to_string(), model: "echo".to_string() })
        }

        async fn describe_image(&self, image_url: &str) -> Result<String, CapabilityError> {
            Ok(format!("image at {image_url}"))
        }
    }

    fn memory() -> Arc<Memory> {
        Arc::new(Memory::new(
            Arc::new(DeterministicEmbeddingProvider::new()),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(InMemoryCacheStore::with_default_budget()),
            MemoryConfig::default(),
        ))
    }

    #[tokio::test]
    async fn memory_save_and_search_round_trip_through_the_bridge() {
        let caps = MemoryGraphCapabilities::new(memory(), Arc::new(EchoLlm));
        let id = caps
            .memory_save("invoices", "SNCB invoice", Payload::new())
            .await
            .expect("save succeeds");
        let results = caps.memory_search("invoices", "SNCB invoice", 5, None).await.expect("search succeeds");
        assert!(results.iter().any(|d| d.id == id));
    }

    #[tokio::test]
    async fn llm_complete_delegates_to_the_injected_client() {
        let caps = MemoryGraphCapabilities::new(memory(), Arc::new(EchoLlm));
        let completion = caps.llm_complete("hello", LlmOptions::default()).await.expect("completes");
        assert_eq!(completion.text, "hello");
    }
}
