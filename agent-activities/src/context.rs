//! [`ActivityContext`]: the per-invocation context every activity receives,
//! carrying its deadline, idempotency key, and a heartbeat sink the
//! workflow runtime uses to detect a stuck worker.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Receives progress reports from a long-running activity. The default
/// [`NoopHeartbeat`] discards them; the workflow runtime supplies a real
/// sink that resets a liveness timer.
pub trait HeartbeatSink: Send + Sync {
    fn heartbeat(&self, detail: &str);
}

/// A [`HeartbeatSink`] that discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHeartbeat;

impl HeartbeatSink for NoopHeartbeat {
    fn heartbeat(&self, _detail: &str) {}
}

/// Context passed to every [`crate::Activity::run`] call.
#[derive(Clone)]
pub struct ActivityContext {
    /// Idempotency key: the same key replayed after a crash must produce
    /// the same result without double-executing side effects.
    pub idempotency_key: String,
    /// Wall-clock deadline after which the runtime cancels the activity.
    pub deadline: Option<DateTime<Utc>>,
    /// 1-indexed attempt number for this idempotency key.
    pub attempt: u32,
    heartbeat: Arc<dyn HeartbeatSink>,
}

impl ActivityContext {
    #[must_use]
    pub fn new(idempotency_key: impl Into<String>) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            deadline: None,
            attempt: 1,
            heartbeat: Arc::new(NoopHeartbeat),
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    #[must_use]
    pub fn with_heartbeat(mut self, sink: Arc<dyn HeartbeatSink>) -> Self {
        self.heartbeat = sink;
        self
    }

    /// Whether `now` is at or past this context's deadline.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn heartbeat(&self, detail: &str) {
        self.heartbeat.heartbeat(detail);
    }
}
