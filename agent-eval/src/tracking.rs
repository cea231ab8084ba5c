//! [`CostTrackingCapabilities`]: wraps any [`GraphCapabilities`] so every
//! `llm_complete`/`memory_search`/`memory_save`/`describe_image` call it
//! mediates also records estimated token usage into a [`CostTracker`] (spec
//! §4.6). Token counts are estimated the same way `agent-memory`'s
//! `truncate_to_token_budget` approximates them — UTF-8 bytes / 4 — since
//! neither `LlmCompletion` nor the memory layer's ports expose a real
//! tokenizer count.

use std::sync::Arc;

use agent_graph::capabilities::{CapabilityError, GraphCapabilities, LlmCompletion, LlmOptions};
use agent_memory::{FilterExpr, Payload, ScoredDocument};
use async_trait::async_trait;

use crate::cost::{CaseCost, CostTracker};

const BYTES_PER_TOKEN: usize = 4;

fn estimate_tokens(text: &str) -> u64 {
    ((text.len() + BYTES_PER_TOKEN - 1) / BYTES_PER_TOKEN) as u64
}

/// Decorates a [`GraphCapabilities`] implementation, recording an estimated
/// [`CaseCost`] into a shared [`CostTracker`] around every call it forwards.
pub struct CostTrackingCapabilities {
    inner: Arc<dyn GraphCapabilities>,
    tracker: Arc<CostTracker>,
}

impl CostTrackingCapabilities {
    #[must_use]
    pub fn new(inner: Arc<dyn GraphCapabilities>, tracker: Arc<CostTracker>) -> Self {
        Self { inner, tracker }
    }
}

#[async_trait]
impl GraphCapabilities for CostTrackingCapabilities {
    async fn memory_search(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>, CapabilityError> {
        self.tracker.record(CaseCost { embedding_tokens: estimate_tokens(query), ..CaseCost::default() });
        self.inner.memory_search(collection, query, top_k, filter).await
    }

    async fn memory_save(
        &self,
        collection: &str,
        content: &str,
        metadata: Payload,
    ) -> Result<u64, CapabilityError> {
        self.tracker.record(CaseCost { embedding_tokens: estimate_tokens(content), ..CaseCost::default() });
        self.inner.memory_save(collection, content, metadata).await
    }

    async fn llm_complete(
        &self,
        prompt: &str,
        options: LlmOptions,
    ) -> Result<LlmCompletion, CapabilityError> {
        let completion = self.inner.llm_complete(prompt, options).await?;
        self.tracker.record(CaseCost {
            prompt_tokens: estimate_tokens(prompt),
            completion_tokens: estimate_tokens(&completion.text),
            ..CaseCost::default()
        });
        Ok(completion)
    }

    async fn describe_image(&self, image_url: &str) -> Result<String, CapabilityError> {
        let description = self.inner.describe_image(image_url).await?;
        self.tracker.record(CaseCost { completion_tokens: estimate_tokens(&description), ..CaseCost::default() });
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_memory::Payload;

    struct StubCapabilities;

    #[async_trait]
    impl GraphCapabilities for StubCapabilities {
        async fn memory_search(
            &self,
            _collection: &str,
            _query: &str,
            _top_k: usize,
            _filter: Option<&FilterExpr>,
        ) -> Result<Vec<ScoredDocument>, CapabilityError> {
            Ok(Vec::new())
        }

        async fn memory_save(&self, _collection: &str, _content: &str, _metadata: Payload) -> Result<u64, CapabilityError> {
            Ok(1)
        }

        async fn llm_complete(&self, _prompt: &str, _options: LlmOptions) -> Result<LlmCompletion, CapabilityError> {
            Ok(LlmCompletion { text: "four".to_string(), model: "stub".to_string() })
        }

        async fn describe_image(&self, _image_url: &str) -> Result<String, CapabilityError> {
            Ok("a photo".to_string())
        }
    }

    #[tokio::test]
    async fn llm_complete_records_prompt_and_completion_tokens() {
        let tracker = Arc::new(CostTracker::new());
        let caps = CostTrackingCapabilities::new(Arc::new(StubCapabilities), Arc::clone(&tracker));
        caps.llm_complete("twelve bytes!", LlmOptions::default()).await.expect("completes");
        let totals = tracker.totals();
        assert_eq!(totals.prompt_tokens, estimate_tokens("twelve bytes!"));
        assert_eq!(totals.completion_tokens, estimate_tokens("four"));
        assert_eq!(totals.embedding_tokens, 0);
    }

    #[tokio::test]
    async fn memory_search_records_embedding_tokens() {
        let tracker = Arc::new(CostTracker::new());
        let caps = CostTrackingCapabilities::new(Arc::new(StubCapabilities), Arc::clone(&tracker));
        caps.memory_search("docs", "a short query", 5, None).await.expect("searches");
        let totals = tracker.totals();
        assert_eq!(totals.embedding_tokens, estimate_tokens("a short query"));
        assert_eq!(totals.prompt_tokens, 0);
    }
}
