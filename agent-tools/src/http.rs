//! The status/trigger HTTP surface, built on
//! `axum`/`tower`/`tower-http` — the stack SPEC_FULL.md's ambient addition
//! borrows from the broader retrieval pack, since the teacher repo exposes
//! its C5-equivalent functionality only over stdio/JSON-RPC, not HTTP.

use std::sync::Arc;

use agent_memory::Memory;
use agent_workflow::{Scheduler, Status, WorkflowError, WorkflowEventStore, WorkflowExecutor};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ToolsError;
use crate::health::AgentMonitor;
use crate::jsonrpc::{default_tools, JsonRpcRequest};
use crate::registry::WorkflowRegistry;
use crate::tools;

/// Shared state every route handler reads from. Cloned per-request by
/// `axum` (each field is already an `Arc`, so the clone is cheap).
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<Memory>,
    pub executor: Arc<WorkflowExecutor>,
    pub store: Arc<dyn WorkflowEventStore>,
    pub registry: Arc<WorkflowRegistry>,
    pub scheduler: Arc<Scheduler>,
    pub monitor: Arc<AgentMonitor>,
}

impl IntoResponse for ToolsError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the router spec §6 describes: liveness/component health, the
/// workflow trigger/query/cancel surface, schedule management, and the
/// JSON-RPC tool interface.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/actors/status", get(actors_status))
        .route("/workflows/{workflow_type}", post(start_workflow))
        .route("/workflows/{id}", get(get_workflow))
        .route("/workflows/{id}/cancel", post(cancel_workflow))
        .route("/schedules", get(list_schedules))
        .route("/schedules/{id}/pause", post(pause_schedule))
        .route("/schedules/{id}/unpause", post(unpause_schedule))
        .route("/tools", post(call_tool))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn actors_status(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::to_value(state.monitor.snapshot()).unwrap_or_else(|_| json!({})))
}

async fn start_workflow(
    State(state): State<AppState>,
    Path(workflow_type): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, ToolsError> {
    let workflow = state
        .registry
        .get(&workflow_type)
        .ok_or_else(|| ToolsError::NotFound(format!("unknown workflow type: {workflow_type}")))?;
    // Returns as soon as the run is durably recorded and scheduled, not
    // once it finishes, so `/workflows/{id}` and `/workflows/{id}/cancel`
    // have an in-flight execution to observe or stop.
    let (run_id, workflow_id) = workflow.start_detached(Arc::clone(&state.executor), input, None).await?;
    Ok(Json(json!({ "workflow_id": workflow_id, "run_id": run_id })))
}

async fn get_workflow(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, ToolsError> {
    let execution = state
        .store
        .load_execution(id)
        .await
        .map_err(ToolsError::from)?
        .ok_or_else(|| ToolsError::NotFound(format!("workflow execution {id}")))?;
    Ok(Json(json!({
        "status": execution.status,
        "history_summary": format!("{} events, workflow_type={}", execution.events.len(), execution.workflow_type),
    })))
}

async fn cancel_workflow(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, ToolsError> {
    match state.executor.cancel(id).await {
        Ok(()) => Ok(Json(json!({ "cancelled": true }))),
        Err(WorkflowError::NotFound(_)) => Ok(Json(json!({ "cancelled": false }))),
        Err(err) => Err(err.into()),
    }
}

async fn list_schedules(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.scheduler.list()))
}

async fn pause_schedule(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, ToolsError> {
    if !state.scheduler.contains(id) {
        return Err(ToolsError::NotFound(format!("schedule {id}")));
    }
    state.scheduler.pause(id);
    Ok(Json(json!({ "paused": true })))
}

async fn unpause_schedule(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, ToolsError> {
    if !state.scheduler.contains(id) {
        return Err(ToolsError::NotFound(format!("schedule {id}")));
    }
    state.scheduler.unpause(id);
    Ok(Json(json!({ "paused": false })))
}

/// `POST /tools`: the JSON-RPC tool interface. `GET /tools` would
/// list `default_tools()`'s schemas, but the table only names the RPC path;
/// the listing is reachable as `tools::default_tools()` for an operator CLI
/// or documentation generator to call directly.
async fn call_tool(State(state): State<AppState>, Json(request): Json<JsonRpcRequest>) -> Json<Value> {
    let response = tools::dispatch(&state.memory, request).await;
    Json(serde_json::to_value(response).unwrap_or_else(|_| json!({})))
}

#[must_use]
pub fn tool_catalog() -> Value {
    json!(default_tools())
}
