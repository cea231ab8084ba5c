//! `agent-tools`: the HTTP status/trigger surface and the JSON-RPC tool
//! interface. Exposes workflow start/query/cancel, schedule
//! pause/unpause/listing, per-component health, and the `search_memory` /
//! `save_to_memory` / `get_memory_stats` tool trio over HTTP, the surface
//! the teacher exposes over stdio/JSON-RPC via `memory-mcp`.

pub mod error;
pub mod health;
pub mod http;
pub mod jsonrpc;
pub mod registry;
pub mod tools;

pub use error::ToolsError;
pub use health::{ActorStatus, ActorsStatusResponse, AgentMonitor, HealthState};
pub use http::{router, AppState};
pub use jsonrpc::{default_tools, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolDefinition};
pub use registry::{DynWorkflow, WorkflowAdapter, WorkflowRegistry};
