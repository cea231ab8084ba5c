//! End-to-end coverage of the workflow trigger/query/cancel surface: a real
//! [`Workflow`] registered in a [`WorkflowRegistry`], driven entirely
//! through HTTP requests against the [`router`].

use std::sync::Arc;

use agent_tools::{router, AgentMonitor, AppState, WorkflowRegistry};
use agent_test_support::test_memory;
use agent_workflow::{InMemoryWorkflowEventStore, Scheduler, Workflow, WorkflowContext, WorkflowError, WorkflowEventStore, WorkflowExecutor};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Clone, Serialize, Deserialize)]
struct GreetInput {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct GreetOutput {
    message: String,
}

struct GreetWorkflow;

#[async_trait]
impl Workflow for GreetWorkflow {
    type Input = GreetInput;
    type Output = GreetOutput;

    fn workflow_type() -> &'static str {
        "greet_workflow"
    }

    async fn run(&self, _ctx: &mut WorkflowContext, input: Self::Input) -> Result<Self::Output, WorkflowError> {
        Ok(GreetOutput { message: format!("hello, {}", input.name) })
    }
}

fn app() -> axum::Router {
    let store: Arc<dyn WorkflowEventStore> = Arc::new(InMemoryWorkflowEventStore::new());
    let mut registry = WorkflowRegistry::new();
    registry.register(GreetWorkflow);
    let state = AppState {
        memory: Arc::new(test_memory()),
        executor: Arc::new(WorkflowExecutor::new(Arc::clone(&store))),
        store,
        registry: Arc::new(registry),
        scheduler: Arc::new(Scheduler::new()),
        monitor: Arc::new(AgentMonitor::new()),
    };
    router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn starting_a_registered_workflow_then_querying_it_round_trips() {
    let app = app();

    let start_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/workflows/greet_workflow")
                .header("content-type", "application/json")
                .body(Body::from(json!({"name": "ada"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(start_response.status(), StatusCode::OK);
    let started = body_json(start_response).await;
    let run_id = started["run_id"].as_str().expect("run_id is a string");

    let query_response = app
        .clone()
        .oneshot(Request::builder().uri(format!("/workflows/{run_id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(query_response.status(), StatusCode::OK);
    let queried = body_json(query_response).await;
    assert_eq!(queried["status"], "completed");
}

#[tokio::test]
async fn cancelling_an_unknown_execution_reports_not_cancelled() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/workflows/{}/cancel", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cancelled"], false);
}

#[tokio::test]
async fn tool_call_through_http_saves_and_reports_stats() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "id": 1,
                        "method": "get_memory_stats",
                        "params": null,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["result"]["cache_entries"].is_number());
}
