//! [`WorkflowContext`]: the deterministic facade workflow bodies use
//! instead of calling `Utc::now()`, `rand`, or an activity directly. Every
//! call either replays a recorded outcome from history or executes live
//! and records the outcome, so re-running the same history always makes
//! the same decisions.

use agent_activities::{Activity, ActivityContext, ActivityError};
use agent_memory::Kind;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::WorkflowError;
use crate::event::{Event, EventKind};
use crate::retry::ActivityRetryPolicy;

/// Threaded through one execution (or replay) of a workflow body.
pub struct WorkflowContext {
    history: Vec<Event>,
    cursor: usize,
    new_events: Vec<Event>,
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl WorkflowContext {
    /// Builds a context from `history` (the execution's already-recorded
    /// replayable events, via [`crate::execution::WorkflowExecution::replayable_events`]).
    /// An empty `history` means this is a fresh run with nothing to replay.
    #[must_use]
    pub fn from_history(history: Vec<Event>) -> Self {
        Self::from_history_with_cancellation(
            history,
            std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        )
    }

    /// Builds a context sharing `cancelled` with whoever holds the
    /// execution's cancellation handle (the executor's `running` table),
    /// so a concurrent `cancel()` call is observed at this run's next
    /// cooperative checkpoint instead of only a fresh flag nobody can reach.
    #[must_use]
    pub fn from_history_with_cancellation(
        history: Vec<Event>,
        cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
    ) -> Self {
        Self { history, cursor: 0, new_events: Vec::new(), cancelled }
    }

    /// Whether the next call will be served from recorded history rather
    /// than executed live.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// A cooperative-cancellation flag a long-running workflow body should
    /// poll between activities.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::Relaxed)
    }

    #[must_use]
    pub fn cancellation_handle(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        std::sync::Arc::clone(&self.cancelled)
    }

    /// Consumes the context, returning the events generated by calls that
    /// were not served from history (for the executor to append to the
    /// store).
    #[must_use]
    pub fn take_new_events(self) -> Vec<Event> {
        self.new_events
    }

    fn next_history_event(&mut self) -> Option<Event> {
        if self.cursor < self.history.len() {
            let event = self.history[self.cursor].clone();
            self.cursor += 1;
            Some(event)
        } else {
            None
        }
    }

    /// A deterministic wall-clock read. Replays to the value recorded the
    /// first time this call site ran.
    ///
    /// # Errors
    /// Returns [`WorkflowError::DeterminismViolation`] if history disagrees
    /// with the call shape (e.g. the workflow body branched differently on
    /// replay than it did live), or [`WorkflowError::Cancelled`] if the
    /// execution was cancelled and this timer has not yet recorded (a
    /// cooperative cancellation checkpoint, spec §4.5).
    pub fn now(&mut self) -> Result<DateTime<Utc>, WorkflowError> {
        if let Some(event) = self.next_history_event() {
            match event.kind {
                EventKind::TimerRecorded { value, .. } => Ok(value),
                other => Err(WorkflowError::DeterminismViolation(format!(
                    "expected TimerRecorded at seq {}, found {other:?}",
                    event.seq
                ))),
            }
        } else if self.is_cancelled() {
            Err(WorkflowError::Cancelled)
        } else {
            let value = Utc::now();
            let seq = self.cursor as u64;
            self.cursor += 1;
            self.new_events.push(Event {
                seq,
                recorded_at: value,
                kind: EventKind::TimerRecorded { seq, value },
            });
            Ok(value)
        }
    }

    /// A deterministic random draw. Replays to the value recorded the
    /// first time this call site ran.
    ///
    /// # Errors
    /// Returns [`WorkflowError::DeterminismViolation`] on a history/call
    /// shape mismatch.
    pub fn random_u64(&mut self) -> Result<u64, WorkflowError> {
        if let Some(event) = self.next_history_event() {
            match event.kind {
                EventKind::RandomRecorded { value, .. } => Ok(value),
                other => Err(WorkflowError::DeterminismViolation(format!(
                    "expected RandomRecorded at seq {}, found {other:?}",
                    event.seq
                ))),
            }
        } else {
            let value: u64 = rand::random();
            let seq = self.cursor as u64;
            self.cursor += 1;
            self.new_events.push(Event {
                seq,
                recorded_at: Utc::now(),
                kind: EventKind::RandomRecorded { seq, value },
            });
            Ok(value)
        }
    }

    /// Runs `activity` with `input`, retrying per `policy` on live
    /// execution. On replay, returns the previously recorded result (or
    /// re-raises the previously recorded failure) without calling the
    /// activity again — the at-most-once guarantee for side effects (spec
    /// §8).
    ///
    /// # Errors
    /// Returns [`WorkflowError::ActivityFailed`] if the activity's retry
    /// policy is exhausted (live) or if history recorded a failure
    /// (replay), [`WorkflowError::DeterminismViolation`] on a history shape
    /// mismatch, or [`WorkflowError::Cancelled`] if the execution was
    /// cancelled before this call scheduled a new activity (a cooperative
    /// cancellation checkpoint, spec §4.5) — a call already served from
    /// history always replays regardless of cancellation.
    pub async fn run_activity<A>(
        &mut self,
        activity: &A,
        activity_ctx: &ActivityContext,
        input: A::Input,
        policy: &ActivityRetryPolicy,
    ) -> Result<A::Output, WorkflowError>
    where
        A: Activity,
        A::Input: Clone,
        A::Output: Serialize + DeserializeOwned,
    {
        if let Some(event) = self.next_history_event() {
            return match event.kind {
                EventKind::ActivityCompleted { result, .. } => serde_json::from_value(result)
                    .map_err(|e| WorkflowError::DeterminismViolation(e.to_string())),
                EventKind::ActivityFailed { message, .. } => Err(WorkflowError::ActivityFailed(message)),
                other => Err(WorkflowError::DeterminismViolation(format!(
                    "expected an activity result at seq {}, found {other:?}",
                    event.seq
                ))),
            };
        }

        if self.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }

        let seq = self.cursor as u64;
        self.cursor += 1;
        let activity_type = activity.activity_type().to_string();
        let outcome = policy
            .run(move || activity.run(activity_ctx, input.clone()), |e| policy.is_retryable(e))
            .await;
        match outcome {
            Ok(output) => {
                let result = serde_json::to_value(&output)
                    .map_err(|e| WorkflowError::Internal(e.to_string()))?;
                self.new_events.push(Event {
                    seq,
                    recorded_at: Utc::now(),
                    kind: EventKind::ActivityCompleted { seq, activity_type, result },
                });
                Ok(output)
            }
            Err(err) => {
                let message = err.to_string();
                self.new_events.push(Event {
                    seq,
                    recorded_at: Utc::now(),
                    kind: EventKind::ActivityFailed { seq, activity_type, message: message.clone() },
                });
                Err(WorkflowError::ActivityFailed(message))
            }
        }
    }
}

/// Maps an [`ActivityError`] onto the shared [`Kind`] taxonomy, reused by
/// [`ActivityRetryPolicy`] to decide retryability without matching on
/// concrete activity-error variants.
#[must_use]
pub fn activity_error_kind(err: &ActivityError) -> Kind {
    err.kind()
}
