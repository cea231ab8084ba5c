//! [`GraphState`]: the contract every node's state type must satisfy so the
//! executor can record its own bookkeeping fields.

/// State threaded through a [`crate::graph::CompiledGraph`] invocation.
///
/// Implementors own their domain fields; these two accessors let the
/// executor append trace data without knowing the concrete state shape.
pub trait GraphState: Clone + Send + Sync + 'static {
    /// Appends a step name. Node implementations call this on success;
    /// never remove or reorder existing entries.
    fn record_step(&mut self, node: &str);

    /// Appends a non-fatal warning surfaced to the caller after `invoke`.
    fn record_warning(&mut self, warning: impl Into<String>);

    /// Steps completed so far, in execution order.
    fn steps_completed(&self) -> &[String];

    /// Warnings accumulated so far, in the order they were recorded.
    fn warnings(&self) -> &[String];
}
