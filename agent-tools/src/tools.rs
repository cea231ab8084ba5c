//! Dispatches JSON-RPC tool calls against the [`agent_memory::Memory`]
//! facade: `search_memory`, `save_to_memory`, `get_memory_stats`.

use agent_memory::{Memory, Payload};
use serde_json::{json, Value};

use crate::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

/// Dispatches one JSON-RPC request to the matching memory tool and builds
/// the response envelope. Never returns `Err`: every failure is carried as
/// a [`JsonRpcError`] inside the response per the JSON-RPC 2.0 contract.
pub async fn dispatch(memory: &Memory, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.clone();
    match request.method.as_str() {
        "search_memory" => search_memory(memory, id, request.params).await,
        "save_to_memory" => save_to_memory(memory, id, request.params).await,
        "get_memory_stats" => get_memory_stats(memory, id).await,
        other => JsonRpcResponse::failure(id, JsonRpcError::new(METHOD_NOT_FOUND, format!("unknown method: {other}"))),
    }
}

fn missing_params(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, "missing params"))
}

async fn search_memory(memory: &Memory, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else { return missing_params(id) };
    let Some(collection) = params.get("collection").and_then(Value::as_str) else {
        return JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, "missing `collection`"));
    };
    let Some(query) = params.get("query").and_then(Value::as_str) else {
        return JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, "missing `query`"));
    };
    let top_k = params.get("top_k").and_then(Value::as_u64).unwrap_or(10) as usize;

    match memory.search(collection, query, top_k, None).await {
        Ok(results) => JsonRpcResponse::success(id, json!({ "results": results })),
        Err(err) => JsonRpcResponse::failure(id, JsonRpcError::new(INTERNAL_ERROR, err.to_string())),
    }
}

async fn save_to_memory(memory: &Memory, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
    let Some(params) = params else { return missing_params(id) };
    let Some(collection) = params.get("collection").and_then(Value::as_str) else {
        return JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, "missing `collection`"));
    };
    let Some(content) = params.get("content").and_then(Value::as_str) else {
        return JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, "missing `content`"));
    };
    let metadata: Payload = match params.get("metadata").cloned() {
        Some(value) => match serde_json::from_value(value) {
            Ok(metadata) => metadata,
            Err(err) => return JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, format!("invalid `metadata`: {err}"))),
        },
        None => return JsonRpcResponse::failure(id, JsonRpcError::new(INVALID_PARAMS, "missing `metadata`")),
    };

    match memory.save(collection, content, metadata).await {
        Ok(doc_id) => JsonRpcResponse::success(id, json!({ "id": doc_id })),
        Err(err) => JsonRpcResponse::failure(id, JsonRpcError::new(INTERNAL_ERROR, err.to_string())),
    }
}

async fn get_memory_stats(memory: &Memory, id: Option<Value>) -> JsonRpcResponse {
    match memory.stats().await {
        Ok(stats) => JsonRpcResponse::success(
            id,
            json!({
                "cache_hit_rate": stats.cache_hit_rate,
                "cache_used_bytes": stats.cache_used_bytes,
                "cache_entries": stats.cache_entries,
                "collections": stats.collections,
                "embeddings_generated": stats.embeddings_generated,
                "embeddings_cached_fraction": stats.embeddings_cached_fraction,
            }),
        ),
        Err(err) => JsonRpcResponse::failure(id, JsonRpcError::new(INTERNAL_ERROR, err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_test_support::test_memory;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_method_reports_method_not_found() {
        let memory = test_memory();
        let request: JsonRpcRequest = serde_json::from_value(json!({"id": 1, "method": "frobnicate", "params": null})).unwrap();
        let response = dispatch(&memory, request).await;
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn save_then_search_round_trips_through_jsonrpc() {
        let memory = test_memory();
        let save_request: JsonRpcRequest = serde_json::from_value(json!({
            "id": 1,
            "method": "save_to_memory",
            "params": {
                "collection": "agent_context",
                "content": "reconciliation context for txn-42",
                "metadata": {
                    "agent_name": {"type": "str", "value": "invoice_matcher"},
                    "context_type": {"type": "str", "value": "match_decision"},
                    "confidence": {"type": "float", "value": 0.92},
                    "transaction_id": {"type": "str", "value": "txn-42"}
                }
            }
        }))
        .unwrap();
        let save_response = dispatch(&memory, save_request).await;
        assert!(save_response.error.is_none(), "{save_response:?}");

        let search_request: JsonRpcRequest = serde_json::from_value(json!({
            "id": 2,
            "method": "search_memory",
            "params": {"collection": "agent_context", "query": "txn-42 reconciliation", "top_k": 5}
        }))
        .unwrap();
        let search_response = dispatch(&memory, search_request).await;
        let result = search_response.result.expect("successful search");
        assert!(!result["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_reports_zero_entries_for_a_fresh_memory() {
        let memory = test_memory();
        let request: JsonRpcRequest = serde_json::from_value(json!({"id": 1, "method": "get_memory_stats", "params": null})).unwrap();
        let response = dispatch(&memory, request).await;
        let result = response.result.expect("stats succeed");
        assert_eq!(result["cache_entries"], 0);
    }
}
