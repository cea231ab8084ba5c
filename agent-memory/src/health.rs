//! [`HealthSink`]: the seam through which this crate and its downstream
//! dependents (`agent-workflow`'s executor, `agent-tools`'s `AgentMonitor`)
//! report per-component health without `agent-memory` depending on the
//! monitor that ultimately renders it. `Memory` is constructed with a
//! [`NoopHealthSink`] by default; a caller that wants `/actors/status` to
//! reflect real backend state swaps in its own sink.

use std::sync::Arc;

/// Reports a component's health as call paths observe it succeed or fail.
/// Implementors own how "component" names map to whatever status table
/// they track; this crate only ever names `embedding_provider` and
/// `vector_store`.
pub trait HealthSink: Send + Sync {
    /// `component` just completed an operation successfully.
    fn record_healthy(&self, component: &str);
    /// `component` failed but may recover (e.g. a retryable error).
    fn record_degraded(&self, component: &str);
    /// `component` failed in a way that suggests it is unreachable.
    fn record_down(&self, component: &str);
}

/// The default sink: discards every report. Used wherever a caller has not
/// wired in a real [`HealthSink`] (tests, `Memory::new`'s default).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHealthSink;

impl HealthSink for NoopHealthSink {
    fn record_healthy(&self, _component: &str) {}
    fn record_degraded(&self, _component: &str) {}
    fn record_down(&self, _component: &str) {}
}

/// A shared handle to [`NoopHealthSink`], cheap to clone into any
/// constructor that wants a default sink.
#[must_use]
pub fn noop_health_sink() -> Arc<dyn HealthSink> {
    Arc::new(NoopHealthSink)
}
