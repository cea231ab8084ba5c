//! [`GraphRunActivity`]: runs a compiled C3 graph as a C4 activity, so a
//! workflow can schedule "run the invoice matcher" or "run the feed
//! publisher" exactly like any other unit of work, with the same retry and
//! idempotency guarantees.

use std::sync::Arc;

use agent_graph::{CompiledGraph, GraphCapabilities, GraphState};
use async_trait::async_trait;

use crate::activity::Activity;
use crate::context::ActivityContext;
use crate::error::ActivityError;

/// Wraps a compiled graph so it can be scheduled as an activity. Graph
/// execution is deterministic given its capabilities' responses, but those
/// capabilities typically call out to embedding providers or LLMs, which is
/// why this still goes through the activity retry path rather than being
/// inlined into workflow replay logic.
pub struct GraphRunActivity<S: GraphState> {
    graph: Arc<CompiledGraph<S>>,
    capabilities: Arc<dyn GraphCapabilities>,
    activity_type: &'static str,
}

impl<S: GraphState> GraphRunActivity<S> {
    #[must_use]
    pub fn new(
        graph: Arc<CompiledGraph<S>>,
        capabilities: Arc<dyn GraphCapabilities>,
        activity_type: &'static str,
    ) -> Self {
        Self { graph, capabilities, activity_type }
    }
}

#[async_trait]
impl<S: GraphState> Activity for GraphRunActivity<S> {
    type Input = S;
    type Output = S;

    fn activity_type(&self) -> &'static str {
        self.activity_type
    }

    async fn run(&self, ctx: &ActivityContext, input: S) -> Result<S, ActivityError> {
        ctx.heartbeat("running graph");
        Ok(self.graph.invoke(input, Arc::clone(&self.capabilities)).await?)
    }
}
