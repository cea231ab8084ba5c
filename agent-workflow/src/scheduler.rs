//! [`Scheduler`]: fires workflow starts on a cron or `HH:MM` daily
//! schedule, applying an [`OverlapPolicy`] when a firing arrives while the
//! previous one is still running. Grounded in the
//! `cron` crate, the schedule-parsing dependency this workspace's retrieval
//! pack uses elsewhere (see DESIGN.md).

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::error::WorkflowError;

/// What to do when a schedule's next firing arrives before the prior
/// firing's workflow execution has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Drop the new firing; the schedule's cadence is advisory, not a
    /// guarantee of exactly-N-per-period.
    Skip,
    /// Queue at most one pending firing to run immediately after the
    /// in-flight execution completes; additional arrivals while one is
    /// already buffered are dropped.
    BufferOne,
    /// Start the new firing concurrently regardless of what is in flight.
    AllowAll,
}

/// Parses spec §6's schedule grammar: a POSIX five-field cron expression
/// (`min hour day month dow`), a six-field cron expression
/// (`sec min hour day month dow`), or an `HH:MM` daily shorthand. The
/// `cron` crate only accepts the six/seven-field grammar, so both the
/// `HH:MM` shorthand and bare five-field input are normalized onto it by
/// prepending a `0` seconds field.
///
/// # Errors
/// Returns [`WorkflowError::InvalidSchedule`] if `expr` matches none of the
/// above.
pub fn parse_schedule_expr(expr: &str) -> Result<CronSchedule, WorkflowError> {
    if let Some((hour, minute)) = parse_hh_mm(expr) {
        let cron_expr = format!("0 {minute} {hour} * * *");
        return CronSchedule::from_str(&cron_expr)
            .map_err(|e| WorkflowError::InvalidSchedule(format!("{expr}: {e}")));
    }
    if expr.split_whitespace().count() == 5 {
        let cron_expr = format!("0 {expr}");
        return CronSchedule::from_str(&cron_expr)
            .map_err(|e| WorkflowError::InvalidSchedule(format!("{expr}: {e}")));
    }
    CronSchedule::from_str(expr).map_err(|e| WorkflowError::InvalidSchedule(format!("{expr}: {e}")))
}

fn parse_hh_mm(expr: &str) -> Option<(u32, u32)> {
    let (h, m) = expr.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour < 24 && minute < 60 {
        Some((hour, minute))
    } else {
        None
    }
}

struct ScheduleState {
    workflow_type: String,
    expr: CronSchedule,
    overlap_policy: OverlapPolicy,
    paused: bool,
    in_flight: bool,
    buffered: bool,
    last_fired: Option<DateTime<Utc>>,
}

/// A schedule's externally visible state.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    pub id: Uuid,
    pub workflow_type: String,
    pub overlap_policy: OverlapPolicy,
    pub paused: bool,
    pub last_fired: Option<DateTime<Utc>>,
}

/// Tracks registered schedules and decides, at each poll, which are due to
/// fire (spec testable property: "schedule monotonicity" — a schedule
/// never fires twice for the same due time).
#[derive(Default)]
pub struct Scheduler {
    schedules: Mutex<HashMap<Uuid, ScheduleState>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new schedule and returns its id.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidSchedule`] if `expr` does not parse.
    pub fn add_schedule(
        &self,
        workflow_type: impl Into<String>,
        expr: &str,
        overlap_policy: OverlapPolicy,
    ) -> Result<Uuid, WorkflowError> {
        let parsed = parse_schedule_expr(expr)?;
        let id = Uuid::new_v4();
        self.schedules.lock().insert(
            id,
            ScheduleState {
                workflow_type: workflow_type.into(),
                expr: parsed,
                overlap_policy,
                paused: false,
                in_flight: false,
                buffered: false,
                last_fired: None,
            },
        );
        Ok(id)
    }

    pub fn pause(&self, id: Uuid) {
        if let Some(state) = self.schedules.lock().get_mut(&id) {
            state.paused = true;
        }
    }

    pub fn unpause(&self, id: Uuid) {
        if let Some(state) = self.schedules.lock().get_mut(&id) {
            state.paused = false;
        }
    }

    /// Every registered schedule's externally visible state, in no
    /// particular order.
    #[must_use]
    pub fn list(&self) -> Vec<ScheduleSummary> {
        self.schedules
            .lock()
            .iter()
            .map(|(id, state)| ScheduleSummary {
                id: *id,
                workflow_type: state.workflow_type.clone(),
                overlap_policy: state.overlap_policy,
                paused: state.paused,
                last_fired: state.last_fired,
            })
            .collect()
    }

    /// Whether `id` names a registered schedule, without mutating it.
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.schedules.lock().contains_key(&id)
    }

    /// Polls at `now`, returning `(schedule_id, workflow_type, fire_time)`
    /// tuples due to fire; `fire_time` is `now`, the instant this firing was
    /// observed due, and is what callers derive each firing's
    /// `{schedule_id}-{fire_time}` workflow id from (spec §4.5). A schedule
    /// whose prior firing is still in flight is skipped, buffered, or
    /// allowed to overlap per its [`OverlapPolicy`]; a paused schedule never
    /// fires.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<(Uuid, String, DateTime<Utc>)> {
        let mut fired = Vec::new();
        let mut guard = self.schedules.lock();
        for (id, state) in guard.iter_mut() {
            if state.paused {
                continue;
            }
            let is_due = match state.last_fired {
                None => state.expr.upcoming(Utc).take(1).next().is_some_and(|t| t <= now),
                Some(last) => state
                    .expr
                    .after(&last)
                    .take(1)
                    .next()
                    .is_some_and(|t| t <= now),
            };
            if !is_due {
                continue;
            }
            let should_fire = if state.in_flight {
                match state.overlap_policy {
                    OverlapPolicy::Skip => false,
                    OverlapPolicy::BufferOne => {
                        let fire_now = !state.buffered;
                        state.buffered = true;
                        fire_now
                    }
                    OverlapPolicy::AllowAll => true,
                }
            } else {
                true
            };
            if should_fire {
                state.last_fired = Some(now);
                if matches!(state.overlap_policy, OverlapPolicy::AllowAll) || !state.in_flight {
                    state.in_flight = true;
                }
                fired.push((*id, state.workflow_type.clone(), now));
            }
        }
        fired
    }

    /// Marks a schedule's in-flight execution as finished. Under
    /// `BufferOne`, a buffered firing becomes immediately due again.
    pub fn mark_completed(&self, id: Uuid) {
        if let Some(state) = self.schedules.lock().get_mut(&id) {
            state.in_flight = false;
            if state.buffered {
                state.buffered = false;
            }
        }
    }
}
