//! JSON-RPC 2.0 request/response envelopes and tool definitions, grounded
//! in the teacher's `memory-mcp::jsonrpc` struct shapes and
//! `memory-mcp::types::Tool`/`server::tool_definitions`. The teacher frames
//! these over stdio/LSP `Content-Length` headers; here the same envelope is
//! carried over HTTP, so only the struct
//! shapes and standard error codes are reused, not the line-framing I/O.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc_version")]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

fn default_jsonrpc_version() -> String {
    "2.0".to_string()
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    #[must_use]
    pub fn failure(id: Option<Value>, error: JsonRpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }
}

/// A tool's name, description, and JSON Schema for its parameters, the same
/// shape the teacher's `Tool::new` builds for its MCP tool table.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self { name: name.into(), description: description.into(), input_schema }
    }
}

/// The three memory-facing tools spec §6 exposes over the JSON-RPC
/// interface: searching, saving, and inspecting collection statistics.
#[must_use]
pub fn default_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "search_memory",
            "Search a memory collection for documents relevant to a query",
            json!({
                "type": "object",
                "properties": {
                    "collection": {"type": "string", "description": "Collection name (e.g. invoices, social_posts)"},
                    "query": {"type": "string", "description": "Natural-language search query"},
                    "top_k": {"type": "integer", "default": 10, "description": "Maximum number of results"}
                },
                "required": ["collection", "query"]
            }),
        ),
        ToolDefinition::new(
            "save_to_memory",
            "Save a document with typed metadata into a memory collection",
            json!({
                "type": "object",
                "properties": {
                    "collection": {"type": "string"},
                    "content": {"type": "string", "description": "Text content to embed"},
                    "metadata": {"type": "object", "description": "Collection-schema-typed metadata fields"}
                },
                "required": ["collection", "content", "metadata"]
            }),
        ),
        ToolDefinition::new(
            "get_memory_stats",
            "Report aggregate document counts and cache statistics across all memory collections",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
    ]
}
