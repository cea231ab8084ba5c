//! Type erasure over [`agent_workflow::Workflow`] so the HTTP surface can
//! dispatch `POST /workflows/{type}` to a statically-typed workflow body
//! chosen at runtime by name. [`Workflow::start`]/`resume` are generic over
//! `W: Workflow`, which a string-keyed route cannot be; [`WorkflowAdapter`]
//! closes over one concrete `W` and exposes the erased [`DynWorkflow`]
//! interface at `serde_json::Value` boundaries, the same pattern the
//! teacher's MCP tool dispatch uses for its tool table (`HashMap<String,
//! Box<dyn Tool>>` keyed by tool name; see `memory-mcp::server`).

use std::collections::HashMap;
use std::sync::Arc;

use agent_workflow::{Workflow, WorkflowError, WorkflowExecutor};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// A workflow body with its input/output types erased to JSON, so many
/// distinct `Workflow` implementations can share one registry.
#[async_trait]
pub trait DynWorkflow: Send + Sync {
    fn workflow_type(&self) -> &'static str;

    async fn start(&self, executor: &WorkflowExecutor, input: Value) -> Result<(Uuid, Value), WorkflowError>;

    /// Starts `input` without waiting for the run to finish: persists the
    /// initial event synchronously and drives the rest of the run on a
    /// spawned task, returning its `(run_id, workflow_id)` immediately. Used
    /// by the HTTP surface and schedule firings so `/workflows/{id}` and
    /// `/workflows/{id}/cancel` have an in-flight execution to act on
    /// instead of only a completed one. `workflow_id` overrides the
    /// execution's externally visible identity (spec §3); `None` defaults
    /// it to the run id's string form.
    async fn start_detached(
        self: Arc<Self>,
        executor: Arc<WorkflowExecutor>,
        input: Value,
        workflow_id: Option<String>,
    ) -> Result<(Uuid, String), WorkflowError>;

    async fn resume(&self, executor: &WorkflowExecutor, id: Uuid) -> Result<Value, WorkflowError>;
}

/// Adapts one concrete `W: Workflow` to [`DynWorkflow`]. `workflow` is
/// `Arc`-wrapped so [`Self::start_detached`] can hand a clone to the
/// spawned task while the registry keeps its own.
pub struct WorkflowAdapter<W> {
    workflow: Arc<W>,
}

impl<W: Workflow> WorkflowAdapter<W> {
    pub fn new(workflow: W) -> Self {
        Self { workflow: Arc::new(workflow) }
    }
}

#[async_trait]
impl<W: Workflow + 'static> DynWorkflow for WorkflowAdapter<W> {
    fn workflow_type(&self) -> &'static str {
        W::workflow_type()
    }

    async fn start(&self, executor: &WorkflowExecutor, input: Value) -> Result<(Uuid, Value), WorkflowError> {
        let typed_input: W::Input =
            serde_json::from_value(input).map_err(|e| WorkflowError::Internal(e.to_string()))?;
        let (id, output) = executor.start(&self.workflow, typed_input).await?;
        let output_json = serde_json::to_value(&output).map_err(|e| WorkflowError::Internal(e.to_string()))?;
        Ok((id, output_json))
    }

    async fn start_detached(
        self: Arc<Self>,
        executor: Arc<WorkflowExecutor>,
        input: Value,
        workflow_id: Option<String>,
    ) -> Result<(Uuid, String), WorkflowError> {
        let typed_input: W::Input =
            serde_json::from_value(input).map_err(|e| WorkflowError::Internal(e.to_string()))?;
        executor.spawn_start(Arc::clone(&self.workflow), typed_input, workflow_id).await
    }

    async fn resume(&self, executor: &WorkflowExecutor, id: Uuid) -> Result<Value, WorkflowError> {
        let output = executor.resume(&self.workflow, id).await?;
        serde_json::to_value(&output).map_err(|e| WorkflowError::Internal(e.to_string()))
    }
}

/// A string-keyed table of workflow bodies, looked up by `workflow_type()`
/// when a `POST /workflows/{type}` request arrives.
#[derive(Default)]
pub struct WorkflowRegistry {
    workflows: HashMap<String, Arc<dyn DynWorkflow>>,
}

impl WorkflowRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `workflow` under its own `workflow_type()` name.
    pub fn register<W: Workflow + 'static>(&mut self, workflow: W) {
        let adapter: Arc<dyn DynWorkflow> = Arc::new(WorkflowAdapter::new(workflow));
        self.workflows.insert(adapter.workflow_type().to_string(), adapter);
    }

    #[must_use]
    pub fn get(&self, workflow_type: &str) -> Option<Arc<dyn DynWorkflow>> {
        self.workflows.get(workflow_type).cloned()
    }

    #[must_use]
    pub fn known_types(&self) -> Vec<String> {
        self.workflows.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_workflow::{InMemoryWorkflowEventStore, WorkflowContext};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Clone, Serialize, Deserialize)]
    struct EchoInput {
        value: u64,
    }

    #[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
    struct EchoOutput {
        value: u64,
    }

    struct EchoWorkflow;

    #[async_trait]
    impl Workflow for EchoWorkflow {
        type Input = EchoInput;
        type Output = EchoOutput;

        fn workflow_type() -> &'static str {
            "echo_workflow"
        }

        async fn run(&self, _ctx: &mut WorkflowContext, input: Self::Input) -> Result<Self::Output, WorkflowError> {
            Ok(EchoOutput { value: input.value })
        }
    }

    #[tokio::test]
    async fn registered_workflow_is_dispatched_by_type_name() {
        let mut registry = WorkflowRegistry::new();
        registry.register(EchoWorkflow);
        assert_eq!(registry.known_types(), vec!["echo_workflow".to_string()]);

        let executor = WorkflowExecutor::new(Arc::new(InMemoryWorkflowEventStore::new()));
        let adapter = registry.get("echo_workflow").expect("registered");
        let (_, output) = adapter.start(&executor, json!({"value": 7})).await.expect("starts");
        assert_eq!(output, json!({"value": 7}));
    }

    #[tokio::test]
    async fn unknown_workflow_type_is_not_found() {
        let registry = WorkflowRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }

    #[tokio::test]
    async fn start_detached_returns_before_the_run_is_recorded_complete() {
        let mut registry = WorkflowRegistry::new();
        registry.register(EchoWorkflow);
        let store = Arc::new(InMemoryWorkflowEventStore::new());
        let executor = Arc::new(WorkflowExecutor::new(store.clone()));
        let adapter = registry.get("echo_workflow").expect("registered");

        let (run_id, workflow_id) = adapter
            .start_detached(Arc::clone(&executor), json!({"value": 9}), None)
            .await
            .expect("starts");
        assert_eq!(workflow_id, run_id.to_string());

        for _ in 0..100 {
            let execution = store.load_execution(run_id).await.expect("load succeeds").expect("execution exists");
            if execution.status != agent_workflow::Status::Running {
                assert_eq!(execution.status, agent_workflow::Status::Completed);
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("detached execution never reached a terminal status");
    }
}
