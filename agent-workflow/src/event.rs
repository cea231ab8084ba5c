//! Event-sourced workflow history: every workflow execution is a sequence
//! of [`Event`]s, and replaying that sequence must always reproduce the
//! same decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a workflow's durable event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic position in the log; doubles as the activity/timer/random
    /// call's replay index.
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: EventKind,
}

/// The kinds of facts a workflow's history can record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    WorkflowStarted { input: serde_json::Value },
    /// A deterministic timestamp read via `WorkflowContext::now`.
    TimerRecorded { seq: u64, value: DateTime<Utc> },
    /// A deterministic random draw via `WorkflowContext::random_u64`.
    RandomRecorded { seq: u64, value: u64 },
    /// An activity ran to completion; `result` is its JSON-encoded output.
    ActivityCompleted { seq: u64, activity_type: String, result: serde_json::Value },
    /// An activity failed after exhausting its retry policy.
    ActivityFailed { seq: u64, activity_type: String, message: String },
    SignalReceived { name: String, payload: serde_json::Value },
    WorkflowCompleted { output: serde_json::Value },
    WorkflowFailed { message: String },
    WorkflowCancelled,
}

impl EventKind {
    /// Whether this event is part of the replayable call sequence
    /// (`WorkflowContext` consumes exactly these in order), as opposed to
    /// the executor's own bookkeeping events.
    #[must_use]
    pub fn is_replayable_call(&self) -> bool {
        matches!(
            self,
            EventKind::TimerRecorded { .. }
                | EventKind::RandomRecorded { .. }
                | EventKind::ActivityCompleted { .. }
                | EventKind::ActivityFailed { .. }
        )
    }
}
