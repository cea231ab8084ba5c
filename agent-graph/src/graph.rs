//! [`StateGraph`]: a builder for stateful DAGs, and [`CompiledGraph`], its
//! validated, executable form. Modeled on the reference `langgraph-core`
//! shape (`add_node`/`add_edge`/`add_conditional_edge`/`compile`/`invoke`),
//! generalized so nodes receive capabilities by dependency injection instead
//! of a shared mutable context.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::capabilities::GraphCapabilities;
use crate::error::GraphError;
use crate::state::GraphState;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A node's step function: runs against the current state and the injected
/// capabilities, returning the next state.
pub type NodeFn<S> = Arc<
    dyn Fn(S, Arc<dyn GraphCapabilities>) -> BoxFuture<'static, Result<S, GraphError>>
        + Send
        + Sync,
>;

/// A router's decision after a node runs: continue to a named node, or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Node(String),
    End,
}

/// A conditional edge's router function.
pub type RouterFn<S> = Arc<dyn Fn(&S) -> RouteTarget + Send + Sync>;

struct ConditionalEdge<S: GraphState> {
    router: RouterFn<S>,
    possible_targets: Vec<RouteTarget>,
}

/// Maximum nodes visited in one [`CompiledGraph::invoke`] before it is
/// treated as a runaway conditional-edge cycle rather than a DAG walk.
const MAX_STEPS: usize = 10_000;

/// Builds a [`CompiledGraph`] by registering nodes and edges, mirroring the
/// reference `StateGraph` API.
pub struct StateGraph<S: GraphState> {
    nodes: HashMap<String, NodeFn<S>>,
    node_order: Vec<String>,
    static_edges: HashMap<String, String>,
    conditional_edges: HashMap<String, ConditionalEdge<S>>,
    entry_points: Vec<String>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            static_edges: HashMap::new(),
            conditional_edges: HashMap::new(),
            entry_points: Vec::new(),
        }
    }

    /// Registers a node under `name`. Re-registering the same name replaces
    /// the previous function but preserves its position in `node_order`.
    pub fn add_node(&mut self, name: impl Into<String>, f: NodeFn<S>) -> &mut Self {
        let name = name.into();
        if !self.nodes.contains_key(&name) {
            self.node_order.push(name.clone());
        }
        self.nodes.insert(name, f);
        self
    }

    /// Adds an unconditional edge: after `from` runs, execution continues at
    /// `to`.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.static_edges.insert(from.into(), to.into());
        self
    }

    /// Adds a conditional edge: after `from` runs, `router` inspects the new
    /// state and picks the next node, or [`RouteTarget::End`]. `possible_targets`
    /// is the declared set of outcomes `router` may return; `compile` checks
    /// every declared target against the registered nodes.
    pub fn add_conditional_edge(
        &mut self,
        from: impl Into<String>,
        router: RouterFn<S>,
        possible_targets: Vec<RouteTarget>,
    ) -> &mut Self {
        self.conditional_edges.insert(from.into(), ConditionalEdge { router, possible_targets });
        self
    }

    /// Declares `name` as the graph's single entry node.
    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry_points.push(name.into());
        self
    }

    /// Validates the graph and produces an executable [`CompiledGraph`].
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEntryNode`], [`GraphError::MultipleEntryNodes`],
    /// [`GraphError::DanglingEdge`], [`GraphError::UnmappedRouterOutput`], or
    /// [`GraphError::UnreachableNode`] if the declared topology is invalid.
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        let entry = match self.entry_points.as_slice() {
            [] => return Err(GraphError::MissingEntryNode),
            [only] => only.clone(),
            _ => return Err(GraphError::MultipleEntryNodes),
        };
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::DanglingEdge { from: "<entry>".to_string(), to: entry });
        }

        for (from, to) in &self.static_edges {
            if !self.nodes.contains_key(to) {
                return Err(GraphError::DanglingEdge { from: from.clone(), to: to.clone() });
            }
        }
        for (from, edge) in &self.conditional_edges {
            for target in &edge.possible_targets {
                if let RouteTarget::Node(name) = target {
                    if !self.nodes.contains_key(name) {
                        return Err(GraphError::UnmappedRouterOutput {
                            node: from.clone(),
                            label: name.clone(),
                        });
                    }
                }
            }
        }

        let mut reachable: HashSet<String> = HashSet::new();
        let mut stack = vec![entry.clone()];
        while let Some(node) = stack.pop() {
            if !reachable.insert(node.clone()) {
                continue;
            }
            if let Some(to) = self.static_edges.get(&node) {
                stack.push(to.clone());
            }
            if let Some(edge) = self.conditional_edges.get(&node) {
                for target in &edge.possible_targets {
                    if let RouteTarget::Node(name) = target {
                        stack.push(name.clone());
                    }
                }
            }
        }
        for name in &self.node_order {
            if !reachable.contains(name) {
                return Err(GraphError::UnreachableNode(name.clone()));
            }
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            static_edges: self.static_edges,
            conditional_edges: self.conditional_edges,
            entry,
        })
    }
}

/// A validated, executable graph.
pub struct CompiledGraph<S: GraphState> {
    nodes: HashMap<String, NodeFn<S>>,
    static_edges: HashMap<String, String>,
    conditional_edges: HashMap<String, ConditionalEdge<S>>,
    entry: String,
}

impl<S: GraphState> CompiledGraph<S> {
    /// Runs the graph to completion from `initial_state`, threading `capabilities`
    /// into every node call.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeFailed`] if a node returns an error, or
    /// [`GraphError::Collaborator`] if execution exceeds [`MAX_STEPS`]
    /// without reaching a terminal node.
    pub async fn invoke(
        &self,
        initial_state: S,
        capabilities: Arc<dyn GraphCapabilities>,
    ) -> Result<S, GraphError> {
        let mut state = initial_state;
        let mut current = self.entry.clone();
        for _ in 0..MAX_STEPS {
            let node_fn = self.nodes.get(&current).ok_or_else(|| GraphError::DanglingEdge {
                from: "<invoke>".to_string(),
                to: current.clone(),
            })?;
            tracing::debug!(node = current.as_str(), "executing graph node");
            state = node_fn(state, Arc::clone(&capabilities)).await.map_err(|source| {
                GraphError::NodeFailed { node: current.clone(), source: Box::new(source) }
            })?;
            state.record_step(&current);

            if let Some(edge) = self.conditional_edges.get(&current) {
                match (edge.router)(&state) {
                    RouteTarget::End => return Ok(state),
                    RouteTarget::Node(next) => {
                        current = next;
                        continue;
                    }
                }
            }
            if let Some(next) = self.static_edges.get(&current) {
                current = next.clone();
                continue;
            }
            return Ok(state);
        }
        Err(GraphError::Collaborator(format!(
            "graph exceeded {MAX_STEPS} steps without reaching a terminal node"
        )))
    }
}
