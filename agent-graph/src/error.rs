//! [`GraphError`]: compile errors are distinct from run errors so
//! [`crate::graph::StateGraph::compile`] can be a pure validation step
//!.

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("graph has no entry node")]
    MissingEntryNode,

    #[error("graph declares more than one entry node")]
    MultipleEntryNodes,

    #[error("node `{0}` is unreachable from the entry node")]
    UnreachableNode(String),

    #[error("edge from `{from}` targets undeclared node `{to}`")]
    DanglingEdge { from: String, to: String },

    #[error("conditional edge from `{node}` can route to undeclared label `{label}`")]
    UnmappedRouterOutput { node: String, label: String },

    #[error("node `{node}` failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("router at node `{node}` returned undeclared label `{label}`")]
    UnroutableLabel { node: String, label: String },

    #[error("external collaborator failure: {0}")]
    Collaborator(String),
}
