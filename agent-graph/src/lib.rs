//! `agent-graph`: C3, the stateful DAG executor for agent reasoning, plus
//! the two concrete graphs spec §4.3 names: the invoice matcher and the
//! feed publisher.

pub mod capabilities;
pub mod error;
pub mod feed_publisher;
pub mod graph;
pub mod invoice_matcher;
pub mod memory_capabilities;
pub mod state;

pub use capabilities::{CapabilityError, GraphCapabilities, LlmCompletion, LlmOptions};
pub use error::GraphError;
pub use graph::{CompiledGraph, NodeFn, RouteTarget, RouterFn, StateGraph};
pub use memory_capabilities::{LlmClient, MemoryGraphCapabilities};
pub use state::GraphState;
