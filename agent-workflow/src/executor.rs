//! [`WorkflowExecutor`]: drives a [`Workflow`] body against its durable
//! history, either starting it fresh or resuming it after a crash. Resuming
//! replays every previously recorded activity/timer/random outcome without
//! re-executing side effects, then continues live from the first
//! unrecorded call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_memory::{noop_health_sink, HealthSink};
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::context::WorkflowContext;
use crate::error::WorkflowError;
use crate::event::{Event, EventKind};
use crate::execution::Status;
use crate::store::WorkflowEventStore;
use crate::workflow::Workflow;

/// Reports `result` against `sink` under `component`: healthy on `Ok`,
/// degraded for a retryable failure kind, down otherwise.
fn report<T>(sink: &dyn HealthSink, component: &str, result: &Result<T, WorkflowError>) {
    match result {
        Ok(_) => sink.record_healthy(component),
        Err(WorkflowError::Cancelled) => {
            // A caller asked for this outcome; it says nothing about the
            // runtime's health.
        }
        Err(err) if err.is_retryable() => sink.record_degraded(component),
        Err(_) => sink.record_down(component),
    }
}

/// Runs [`Workflow`] bodies against a [`WorkflowEventStore`].
pub struct WorkflowExecutor {
    store: Arc<dyn WorkflowEventStore>,
    /// Cancellation flags for executions currently being driven, keyed by
    /// execution id. Entries exist only for the lifetime of one `drive`
    /// call, which lets `cancel()` reach an in-flight run whether it was
    /// started synchronously or spawned via [`Self::spawn_start`].
    running: Mutex<HashMap<Uuid, Arc<AtomicBool>>>,
    health: Arc<dyn HealthSink>,
}

impl WorkflowExecutor {
    #[must_use]
    pub fn new(store: Arc<dyn WorkflowEventStore>) -> Self {
        Self { store, running: Mutex::new(HashMap::new()), health: noop_health_sink() }
    }

    /// Swaps in a real [`HealthSink`] (e.g. `agent-tools`'s `AgentMonitor`)
    /// so `workflow_runtime` health reflects this executor's actual run
    /// outcomes rather than staying silently healthy forever.
    #[must_use]
    pub fn with_health_sink(mut self, sink: Arc<dyn HealthSink>) -> Self {
        self.health = sink;
        self
    }

    /// Starts a new execution and drives it to completion.
    ///
    /// # Errors
    /// Propagates whatever `workflow.run` returns, after durably recording
    /// the failure.
    pub async fn start<W: Workflow>(
        &self,
        workflow: &W,
        input: W::Input,
    ) -> Result<(Uuid, W::Output), WorkflowError> {
        self.start_with_timeout(workflow, input, None).await
    }

    /// Starts a new execution, failing it with [`WorkflowError::TimedOut`]
    /// and [`Status::TimedOut`] if it has not reached a terminal node
    /// within `workflow_execution_timeout` (spec §5).
    ///
    /// # Errors
    /// Propagates whatever `workflow.run` returns, after durably recording
    /// the failure, or [`WorkflowError::TimedOut`] if the deadline elapses
    /// first.
    pub async fn start_with_timeout<W: Workflow>(
        &self,
        workflow: &W,
        input: W::Input,
        workflow_execution_timeout: Option<Duration>,
    ) -> Result<(Uuid, W::Output), WorkflowError> {
        let id = Uuid::new_v4();
        let input_json =
            serde_json::to_value(&input).map_err(|e| WorkflowError::Internal(e.to_string()))?;
        self.store.create_execution(id, &id.to_string(), W::workflow_type(), input_json).await?;
        let output = self.drive_with_timeout(workflow, id, input, Vec::new(), workflow_execution_timeout).await?;
        Ok((id, output))
    }

    /// Starts a new execution without waiting for it to finish: persists the
    /// initial event synchronously, registers its cancellation handle, then
    /// drives the workflow body on a spawned task. Returns the `run_id`
    /// immediately so a caller (the HTTP surface, a schedule firing) can
    /// observe or cancel the execution while it is still in flight (spec
    /// §4.5, scenario S5) instead of only after it has already completed.
    ///
    /// `workflow` is `Arc`-wrapped because it must outlive this call and be
    /// shared with the spawned task. `workflow_id` names this execution's
    /// externally visible identity distinct from the `run_id` this call
    /// returns (spec §3); passing `None` defaults it to the run id's string
    /// form. A schedule firing passes `Some({schedule_id}-{fire_time})`
    /// (spec §4.5).
    ///
    /// # Errors
    /// Propagates whatever persisting the initial event returns. Failures
    /// during the spawned run are recorded in the execution's history and
    /// status instead of being returned here.
    pub async fn spawn_start<W>(
        self: Arc<Self>,
        workflow: Arc<W>,
        input: W::Input,
        workflow_id: Option<String>,
    ) -> Result<(Uuid, String), WorkflowError>
    where
        W: Workflow + 'static,
    {
        let id = Uuid::new_v4();
        let workflow_id = workflow_id.unwrap_or_else(|| id.to_string());
        let input_json =
            serde_json::to_value(&input).map_err(|e| WorkflowError::Internal(e.to_string()))?;
        self.store.create_execution(id, &workflow_id, W::workflow_type(), input_json).await?;
        let cancelled = self.register_running(id);
        let returned_id = workflow_id.clone();
        tokio::spawn(async move {
            let _ = self.drive_registered(workflow.as_ref(), id, input, Vec::new(), cancelled).await;
        });
        Ok((id, returned_id))
    }

    /// Resumes a previously started execution, replaying its recorded
    /// history before continuing live (spec scenario S6).
    ///
    /// # Errors
    /// Returns [`WorkflowError::NotFound`] if `id` has no execution, or
    /// propagates `workflow.run`'s error after durably recording it.
    pub async fn resume<W: Workflow>(&self, workflow: &W, id: Uuid) -> Result<W::Output, WorkflowError> {
        self.resume_with_timeout(workflow, id, None).await
    }

    /// Resumes a previously started execution under the same
    /// `workflow_execution_timeout` semantics as [`Self::start_with_timeout`].
    ///
    /// # Errors
    /// Returns [`WorkflowError::NotFound`] if `id` has no execution,
    /// propagates `workflow.run`'s error after durably recording it, or
    /// [`WorkflowError::TimedOut`] if the deadline elapses first.
    pub async fn resume_with_timeout<W: Workflow>(
        &self,
        workflow: &W,
        id: Uuid,
        workflow_execution_timeout: Option<Duration>,
    ) -> Result<W::Output, WorkflowError> {
        let execution = self.store.load_execution(id).await?.ok_or(WorkflowError::NotFound(id))?;
        let started = execution
            .events
            .first()
            .ok_or_else(|| WorkflowError::Internal("execution has no WorkflowStarted event".to_string()))?;
        let input = match &started.kind {
            EventKind::WorkflowStarted { input } => serde_json::from_value(input.clone())
                .map_err(|e| WorkflowError::DeterminismViolation(e.to_string()))?,
            other => {
                return Err(WorkflowError::Internal(format!(
                    "execution's first event is not WorkflowStarted: {other:?}"
                )))
            }
        };
        self.drive_with_timeout(workflow, id, input, execution.replayable_events(), workflow_execution_timeout)
            .await
    }

    async fn drive_with_timeout<W: Workflow>(
        &self,
        workflow: &W,
        id: Uuid,
        input: W::Input,
        history: Vec<Event>,
        workflow_execution_timeout: Option<Duration>,
    ) -> Result<W::Output, WorkflowError> {
        let Some(budget) = workflow_execution_timeout else {
            return self.drive(workflow, id, input, history).await;
        };
        match tokio::time::timeout(budget, self.drive(workflow, id, input, history)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                // The timed-out future is dropped without reaching
                // `drive`'s own cleanup, so the running-table entry would
                // otherwise leak.
                self.unregister_running(id);
                self.store
                    .append_events(
                        id,
                        vec![Event { seq: u64::MAX, recorded_at: Utc::now(), kind: EventKind::WorkflowFailed {
                            message: "workflow_execution_timeout exceeded".to_string(),
                        } }],
                    )
                    .await?;
                self.store.set_status(id, Status::TimedOut).await?;
                self.health.record_degraded("workflow_runtime");
                Err(WorkflowError::TimedOut)
            }
        }
    }

    /// Requests cooperative cancellation. If `id` is currently being driven
    /// (synchronously or via [`Self::spawn_start`]), its shared flag is
    /// flipped so the run observes it at its next checkpoint (spec §4.5);
    /// either way the execution's durable status is set to `Cancelled`
    /// immediately.
    ///
    /// # Errors
    /// Returns [`WorkflowError::NotFound`] if `id` has no execution.
    pub async fn cancel(&self, id: Uuid) -> Result<(), WorkflowError> {
        if let Some(flag) = self.running.lock().get(&id) {
            flag.store(true, Ordering::Relaxed);
        }
        self.store
            .append_events(
                id,
                vec![Event { seq: u64::MAX, recorded_at: Utc::now(), kind: EventKind::WorkflowCancelled }],
            )
            .await?;
        self.store.set_status(id, Status::Cancelled).await
    }

    fn register_running(&self, id: Uuid) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.running.lock().insert(id, Arc::clone(&flag));
        flag
    }

    fn unregister_running(&self, id: Uuid) {
        self.running.lock().remove(&id);
    }

    async fn drive<W: Workflow>(
        &self,
        workflow: &W,
        id: Uuid,
        input: W::Input,
        history: Vec<Event>,
    ) -> Result<W::Output, WorkflowError> {
        let cancelled = self.register_running(id);
        self.drive_registered(workflow, id, input, history, cancelled).await
    }

    /// The shared body of [`Self::drive`] and [`Self::spawn_start`]: both
    /// register `id`'s cancellation flag up front (the former right before
    /// calling this, the latter before the task is even spawned, closing
    /// the race where a `cancel()` arrives before the run has registered
    /// itself) and pass it in here.
    async fn drive_registered<W: Workflow>(
        &self,
        workflow: &W,
        id: Uuid,
        input: W::Input,
        history: Vec<Event>,
        cancelled: Arc<AtomicBool>,
    ) -> Result<W::Output, WorkflowError> {
        let mut ctx = WorkflowContext::from_history_with_cancellation(history, cancelled);
        let result = workflow.run(&mut ctx, input).await;
        let new_events = ctx.take_new_events();
        if !new_events.is_empty() {
            self.store.append_events(id, new_events).await?;
        }
        let outcome = match result {
            Ok(output) => {
                let output_json = serde_json::to_value(&output)
                    .map_err(|e| WorkflowError::Internal(e.to_string()))?;
                self.store
                    .append_events(
                        id,
                        vec![Event {
                            seq: u64::MAX,
                            recorded_at: Utc::now(),
                            kind: EventKind::WorkflowCompleted { output: output_json },
                        }],
                    )
                    .await?;
                self.store.set_status(id, Status::Completed).await?;
                Ok(output)
            }
            Err(WorkflowError::Cancelled) => {
                self.store
                    .append_events(
                        id,
                        vec![Event { seq: u64::MAX, recorded_at: Utc::now(), kind: EventKind::WorkflowCancelled }],
                    )
                    .await?;
                self.store.set_status(id, Status::Cancelled).await?;
                Err(WorkflowError::Cancelled)
            }
            Err(err) => {
                self.store
                    .append_events(
                        id,
                        vec![Event {
                            seq: u64::MAX,
                            recorded_at: Utc::now(),
                            kind: EventKind::WorkflowFailed { message: err.to_string() },
                        }],
                    )
                    .await?;
                self.store.set_status(id, Status::Failed).await?;
                Err(err)
            }
        };
        self.unregister_running(id);
        report(self.health.as_ref(), "workflow_runtime", &outcome);
        outcome
    }
}
