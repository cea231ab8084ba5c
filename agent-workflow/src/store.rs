//! [`WorkflowEventStore`]: durable persistence for workflow executions.
//! Mirrors the reference `durable::persistence::WorkflowEventStore` shape
//! (create/append/load/list), generalized from Postgres-backed to a port
//! this crate defines and an in-memory implementation satisfies; a durable
//! backend can implement the same trait without touching the executor.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::event::Event;
use crate::execution::{Status, WorkflowExecution};

/// Durable storage for workflow executions and their event histories.
#[async_trait]
pub trait WorkflowEventStore: Send + Sync {
    async fn create_execution(
        &self,
        id: Uuid,
        workflow_id: &str,
        workflow_type: &str,
        input: serde_json::Value,
    ) -> Result<(), WorkflowError>;

    /// Appends `events` to `id`'s history; not applying them is an error,
    /// since history loss would let two nodes reach divergent replays.
    async fn append_events(&self, id: Uuid, events: Vec<Event>) -> Result<(), WorkflowError>;

    async fn set_status(&self, id: Uuid, status: Status) -> Result<(), WorkflowError>;

    async fn load_execution(&self, id: Uuid) -> Result<Option<WorkflowExecution>, WorkflowError>;

    async fn list_executions(&self) -> Result<Vec<WorkflowExecution>, WorkflowError>;
}

/// In-process [`WorkflowEventStore`], the default for tests and
/// single-node development.
#[derive(Default)]
pub struct InMemoryWorkflowEventStore {
    executions: Mutex<HashMap<Uuid, WorkflowExecution>>,
}

impl InMemoryWorkflowEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowEventStore for InMemoryWorkflowEventStore {
    async fn create_execution(
        &self,
        id: Uuid,
        workflow_id: &str,
        workflow_type: &str,
        input: serde_json::Value,
    ) -> Result<(), WorkflowError> {
        let now = Utc::now();
        let started = Event {
            seq: 0,
            recorded_at: now,
            kind: crate::event::EventKind::WorkflowStarted { input },
        };
        let execution = WorkflowExecution {
            id,
            workflow_id: workflow_id.to_string(),
            workflow_type: workflow_type.to_string(),
            status: Status::Running,
            events: vec![started],
            created_at: now,
            updated_at: now,
        };
        self.executions.lock().insert(id, execution);
        Ok(())
    }

    async fn append_events(&self, id: Uuid, events: Vec<Event>) -> Result<(), WorkflowError> {
        let mut guard = self.executions.lock();
        let execution = guard.get_mut(&id).ok_or(WorkflowError::NotFound(id))?;
        execution.events.extend(events);
        execution.updated_at = Utc::now();
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: Status) -> Result<(), WorkflowError> {
        let mut guard = self.executions.lock();
        let execution = guard.get_mut(&id).ok_or(WorkflowError::NotFound(id))?;
        execution.status = status;
        execution.updated_at = Utc::now();
        Ok(())
    }

    async fn load_execution(&self, id: Uuid) -> Result<Option<WorkflowExecution>, WorkflowError> {
        Ok(self.executions.lock().get(&id).cloned())
    }

    async fn list_executions(&self) -> Result<Vec<WorkflowExecution>, WorkflowError> {
        Ok(self.executions.lock().values().cloned().collect())
    }
}
