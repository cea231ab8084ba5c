//! [`InvoiceMatcherWorkflow`]: schedules the invoice-matcher graph (spec
//! §4.3.1) as a single durable activity per transaction.

use std::sync::Arc;

use agent_activities::{ActivityContext, GraphRunActivity};
use agent_graph::invoice_matcher::{self, CandidateInvoice, InvoiceMatcherState, Transaction};
use agent_graph::{GraphCapabilities, GraphError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::WorkflowContext;
use crate::error::WorkflowError;
use crate::retry::ActivityRetryPolicy;
use crate::workflow::Workflow;

/// Input a caller provides to start one invoice-matcher run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceMatcherWorkflowInput {
    pub transaction: Transaction,
    pub candidates: Vec<CandidateInvoice>,
}

/// Runs the invoice-matcher graph to completion inside the durable
/// runtime. The graph itself is one activity: its own internal nodes are
/// not individually durable, since `search_memory`/`save_context` are
/// idempotent against the activity's retry, not against each other (spec
/// §4.4, bridging C3 into C5).
pub struct InvoiceMatcherWorkflow {
    activity: GraphRunActivity<InvoiceMatcherState>,
    retry_policy: ActivityRetryPolicy,
}

impl InvoiceMatcherWorkflow {
    /// # Errors
    /// Propagates [`GraphError`] if the invoice-matcher topology fails to
    /// compile (spec-fixed topology; cannot happen in practice).
    pub fn new(capabilities: Arc<dyn GraphCapabilities>) -> Result<Self, GraphError> {
        let graph = Arc::new(invoice_matcher::build()?);
        Ok(Self {
            activity: GraphRunActivity::new(graph, capabilities, "graph.run.invoice_matcher"),
            retry_policy: ActivityRetryPolicy::default(),
        })
    }
}

#[async_trait]
impl Workflow for InvoiceMatcherWorkflow {
    type Input = InvoiceMatcherWorkflowInput;
    type Output = InvoiceMatcherState;

    fn workflow_type() -> &'static str {
        "invoice_matcher"
    }

    async fn run(&self, ctx: &mut WorkflowContext, input: Self::Input) -> Result<Self::Output, WorkflowError> {
        let state = InvoiceMatcherState::new(input.transaction.clone(), input.candidates);
        let activity_ctx = ActivityContext::new(format!("invoice-matcher-{}", input.transaction.transaction_id));
        ctx.run_activity(&self.activity, &activity_ctx, state, &self.retry_policy).await
    }
}

#[cfg(test)]
mod tests {
    use agent_graph::MemoryGraphCapabilities;
    use agent_memory::embeddings::DeterministicEmbeddingProvider;
    use agent_memory::{Memory, MemoryConfig};
    use agent_memory_store_cache::InMemoryCacheStore;
    use agent_memory_store_vector::InMemoryVectorStore;
    use chrono::NaiveDate;

    use super::*;

    struct NoLlm;

    #[async_trait]
    impl agent_graph::LlmClient for NoLlm {
        async fn complete(
            &self,
            _prompt: &str,
            _options: agent_graph::LlmOptions,
        ) -> Result<agent_graph::LlmCompletion, agent_graph::CapabilityError> {
            unreachable!("invoice matcher never calls the LLM")
        }

        async fn describe_image(&self, _image_url: &str) -> Result<String, agent_graph::CapabilityError> {
            unreachable!("invoice matcher never calls the LLM")
        }
    }

    fn capabilities() -> Arc<dyn GraphCapabilities> {
        let memory = Arc::new(Memory::new(
            Arc::new(DeterministicEmbeddingProvider::new()),
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(InMemoryCacheStore::with_default_budget()),
            MemoryConfig::default(),
        ));
        Arc::new(MemoryGraphCapabilities::new(memory, Arc::new(NoLlm)))
    }

    #[tokio::test]
    async fn runs_end_to_end_and_auto_matches_an_exact_transaction() {
        let workflow = InvoiceMatcherWorkflow::new(capabilities()).expect("graph compiles");
        let mut ctx = WorkflowContext::from_history(Vec::new());
        let input = InvoiceMatcherWorkflowInput {
            transaction: Transaction {
                transaction_id: "txn-1".to_string(),
                vendor_name: "SNCB".to_string(),
                amount: 22.70,
                date: NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date"),
            },
            candidates: vec![CandidateInvoice {
                invoice_id: 1,
                vendor_name: "SNCB".to_string(),
                amount: 22.70,
                date: NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date"),
            }],
        };
        let output = workflow.run(&mut ctx, input).await.expect("workflow succeeds");
        assert!(output.matched);
        assert_eq!(output.invoice_id, Some(1));
    }

    #[tokio::test]
    async fn replays_from_history_without_rerunning_the_activity() {
        let workflow = InvoiceMatcherWorkflow::new(capabilities()).expect("graph compiles");
        let input = InvoiceMatcherWorkflowInput {
            transaction: Transaction {
                transaction_id: "txn-2".to_string(),
                vendor_name: "Unknown".to_string(),
                amount: 5.0,
                date: NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date"),
            },
            candidates: Vec::new(),
        };
        let mut ctx = WorkflowContext::from_history(Vec::new());
        workflow.run(&mut ctx, input.clone()).await.expect("workflow succeeds");
        let history = ctx.take_new_events();

        let mut replay_ctx = WorkflowContext::from_history(history);
        let replayed = workflow.run(&mut replay_ctx, input).await.expect("replay succeeds");
        assert!(!replayed.matched);
        assert!(replay_ctx.take_new_events().is_empty());
    }
}
