//! [`WorkflowExecution`]: the durable record of one workflow run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// A workflow execution's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    Completed,
    Failed,
    Cancelled,
    /// The execution exceeded its declared `workflow_execution_timeout`
    /// (spec §5) before reaching a terminal node.
    TimedOut,
}

/// One durable workflow execution: its identity, status, and full event
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: Uuid,
    /// The execution's externally visible identity (spec §3): defaults to
    /// `id`'s string form for directly started runs, but for a schedule
    /// firing is `{schedule_id}-{fire_time}` (spec §4.5), distinguishing
    /// repeat firings of the same schedule from the durable `id` (`run_id`)
    /// each one is assigned.
    pub workflow_id: String,
    pub workflow_type: String,
    pub status: Status,
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowExecution {
    /// The subsequence of history a `WorkflowContext` replays through
    /// (excludes executor bookkeeping events like `WorkflowStarted`).
    #[must_use]
    pub fn replayable_events(&self) -> Vec<Event> {
        self.events.iter().filter(|e| e.kind.is_replayable_call()).cloned().collect()
    }
}
