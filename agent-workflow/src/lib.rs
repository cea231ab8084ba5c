//! `agent-workflow`: C5, the event-sourced durable execution runtime.
//!
//! A [`Workflow`] body is driven by a [`WorkflowExecutor`] against a
//! [`WorkflowEventStore`]; all non-determinism (clock reads, random draws,
//! activity calls) goes through the [`WorkflowContext`] facade so resuming
//! an execution after a crash replays its recorded history instead of
//! re-running side effects. The shape is
//! generalized from the reference "everruns-durable" event-sourced
//! workflow engine (see DESIGN.md): one append-only event log per
//! execution, a replay cursor, and a `Schedule`/`Scheduler` pair driving
//! workflow starts on a cadence.

pub mod context;
pub mod error;
pub mod event;
pub mod execution;
pub mod executor;
pub mod retry;
pub mod scheduler;
pub mod store;
pub mod workflow;
pub mod workflows;

pub use context::{activity_error_kind, WorkflowContext};
pub use error::WorkflowError;
pub use event::{Event, EventKind};
pub use execution::{Status, WorkflowExecution};
pub use executor::WorkflowExecutor;
pub use retry::ActivityRetryPolicy;
pub use scheduler::{parse_schedule_expr, OverlapPolicy, ScheduleSummary, Scheduler};
pub use store::{InMemoryWorkflowEventStore, WorkflowEventStore};
pub use workflow::Workflow;
pub use workflows::{
    FeedPublisherWorkflow, FeedPublisherWorkflowInput, InvoiceMatcherWorkflow, InvoiceMatcherWorkflowInput,
};
