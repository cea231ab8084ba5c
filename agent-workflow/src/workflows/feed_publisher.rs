//! [`FeedPublisherWorkflow`]: schedules the feed-publisher graph (spec
//! §4.3.2) as a single durable activity per post request.

use std::sync::Arc;

use agent_activities::{ActivityContext, GraphRunActivity};
use agent_graph::feed_publisher::{self, FeedPublisherState, SocialPostRequest};
use agent_graph::{GraphCapabilities, GraphError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::WorkflowContext;
use crate::error::WorkflowError;
use crate::retry::ActivityRetryPolicy;
use crate::workflow::Workflow;

/// Input a caller provides to start one feed-publisher run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPublisherWorkflowInput {
    pub request: SocialPostRequest,
    /// Caller-supplied idempotency key; falls back to `brand:platform` when
    /// absent, which is adequate for one-shot CLI runs but not for a
    /// high-volume scheduler that might enqueue the same brand/platform pair
    /// twice in one tick.
    pub idempotency_key: Option<String>,
}

/// Runs the feed-publisher graph to completion inside the durable runtime.
pub struct FeedPublisherWorkflow {
    activity: GraphRunActivity<FeedPublisherState>,
    retry_policy: ActivityRetryPolicy,
}

impl FeedPublisherWorkflow {
    /// # Errors
    /// Propagates [`GraphError`] if the feed-publisher topology fails to
    /// compile (spec-fixed topology; cannot happen in practice).
    pub fn new(capabilities: Arc<dyn GraphCapabilities>) -> Result<Self, GraphError> {
        let graph = Arc::new(feed_publisher::build()?);
        Ok(Self {
            activity: GraphRunActivity::new(graph, capabilities, "graph.run.feed_publisher"),
            retry_policy: ActivityRetryPolicy::default(),
        })
    }
}

#[async_trait]
impl Workflow for FeedPublisherWorkflow {
    type Input = FeedPublisherWorkflowInput;
    type Output = FeedPublisherState;

    fn workflow_type() -> &'static str {
        "feed_publisher"
    }

    async fn run(&self, ctx: &mut WorkflowContext, input: Self::Input) -> Result<Self::Output, WorkflowError> {
        let key = input
            .idempotency_key
            .unwrap_or_else(|| format!("feed-publisher-{}-{}", input.request.brand, input.request.platform));
        let state = FeedPublisherState::new(input.request);
        let activity_ctx = ActivityContext::new(key);
        ctx.run_activity(&self.activity, &activity_ctx, state, &self.retry_policy).await
    }
}

#[cfg(test)]
mod tests {
    use agent_graph::{LlmClient, LlmCompletion, LlmOptions, MemoryGraphCapabilities};
    use agent_memory::embeddings::DeterministicEmbeddingProvider;
    use agent_memory::{Memory, MemoryConfig};
    use agent_memory_store_cache::InMemoryCacheStore;
    use agent_memory_store_vector::InMemoryVectorStore;

    use super::*;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(
            &self,
            _prompt: &str,
            _options: LlmOptions,
        ) -> Result<LlmCompletion, agent_graph::CapabilityError> {
            Ok(LlmCompletion {
                text: "Shop now for Acme's latest drop, available today! #acme 🎉🛍️".to_string(),
                model: "echo".to_string(),
            })
        }

        async fn describe_image(&self, image_url: &str) -> Result<String, agent_graph::CapabilityError> {
            Ok(format!("image at {image_url}"))
        }
    }

    fn capabilities() -> Arc<dyn GraphCapabilities> {
        let memory = Arc::new(Memory::new(
            Arc::new(DeterministicEmbeddingProvider::new()),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(InMemoryCacheStore::with_default_budget()),
            MemoryConfig::default(),
        ));
        Arc::new(MemoryGraphCapabilities::new(memory, Arc::new(EchoLlm)))
    }

    fn request() -> SocialPostRequest {
        SocialPostRequest {
            brand: "Acme".to_string(),
            platform: "instagram".to_string(),
            image_url: Some("https://example.com/drop.jpg".to_string()),
            target_language: "en".to_string(),
            target_language_keywords: vec!["the".to_string(), "available".to_string()],
        }
    }

    #[tokio::test]
    async fn runs_end_to_end_and_saves_to_memory() {
        let workflow = FeedPublisherWorkflow::new(capabilities()).expect("graph compiles");
        let mut ctx = WorkflowContext::from_history(Vec::new());
        let input = FeedPublisherWorkflowInput { request: request(), idempotency_key: None };
        let output = workflow.run(&mut ctx, input).await.expect("workflow succeeds");
        assert!(output.saved_document_id.is_some());
    }

    #[tokio::test]
    async fn replays_from_history_without_rerunning_the_activity() {
        let workflow = FeedPublisherWorkflow::new(capabilities()).expect("graph compiles");
        let input = FeedPublisherWorkflowInput { request: request(), idempotency_key: None };
        let mut ctx = WorkflowContext::from_history(Vec::new());
        let first = workflow.run(&mut ctx, input.clone()).await.expect("workflow succeeds");
        let history = ctx.take_new_events();

        let mut replay_ctx = WorkflowContext::from_history(history);
        let replayed = workflow.run(&mut replay_ctx, input).await.expect("replay succeeds");
        assert_eq!(replayed.saved_document_id, first.saved_document_id);
        assert!(replay_ctx.take_new_events().is_empty());
    }
}
