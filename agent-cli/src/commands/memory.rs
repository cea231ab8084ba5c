//! `agent-cli memory`: save/search/stats against the C2 memory layer
//! directly, bypassing the HTTP/JSON-RPC surface for operator use.

use agent_memory::Payload;
use anyhow::Result;
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::output::{print_output, Output, OutputFormat};

#[derive(Debug, Serialize)]
struct SaveReport {
    collection: String,
    document_id: u64,
}

impl Output for SaveReport {
    fn write_human(&self) -> String {
        format!("saved to {} as document {}", self.collection, self.document_id)
    }
}

#[derive(Debug, Serialize)]
struct SearchReport {
    collection: String,
    query: String,
    results: Vec<agent_memory::ScoredDocument>,
}

impl Output for SearchReport {
    fn write_human(&self) -> String {
        if self.results.is_empty() {
            return format!("no matches for \"{}\" in {}", self.query, self.collection);
        }
        let mut lines = vec![format!("{} match(es) for \"{}\" in {}:", self.results.len(), self.query, self.collection)];
        for doc in &self.results {
            lines.push(format!("  #{} score={:.4} {:?}", doc.id, doc.score, doc.payload));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
struct StatsReport {
    cache_hit_rate: f64,
    cache_used_bytes: u64,
    cache_entries: u64,
    collections: Vec<(String, u64)>,
    embeddings_generated: u64,
    embeddings_cached_fraction: f64,
}

impl Output for StatsReport {
    fn write_human(&self) -> String {
        let mut lines = vec![
            format!("cache hit rate: {:.2}%", self.cache_hit_rate * 100.0),
            format!("cache used bytes: {}", self.cache_used_bytes),
            format!("cache entries: {}", self.cache_entries),
            format!("embeddings generated: {}", self.embeddings_generated),
            format!("embeddings served from cache: {:.2}%", self.embeddings_cached_fraction * 100.0),
        ];
        for (name, count) in &self.collections {
            lines.push(format!("  {name}: {count} document(s)"));
        }
        lines.join("\n")
    }
}

pub async fn handle_save_command(
    ctx: &RuntimeContext,
    collection: &str,
    content: &str,
    metadata_json: &str,
    format: OutputFormat,
) -> Result<()> {
    let metadata: Payload = serde_json::from_str(metadata_json)?;
    let document_id = ctx.memory.save(collection, content, metadata).await?;
    print_output(&SaveReport { collection: collection.to_string(), document_id }, format)
}

pub async fn handle_search_command(
    ctx: &RuntimeContext,
    collection: &str,
    query: &str,
    top_k: usize,
    format: OutputFormat,
) -> Result<()> {
    let results = ctx.memory.search(collection, query, top_k, None).await?;
    print_output(&SearchReport { collection: collection.to_string(), query: query.to_string(), results }, format)
}

pub async fn handle_stats_command(ctx: &RuntimeContext, format: OutputFormat) -> Result<()> {
    let stats = ctx.memory.stats().await?;
    let report = StatsReport {
        cache_hit_rate: stats.cache_hit_rate,
        cache_used_bytes: stats.cache_used_bytes,
        cache_entries: stats.cache_entries,
        collections: stats.collections,
        embeddings_generated: stats.embeddings_generated,
        embeddings_cached_fraction: stats.embeddings_cached_fraction,
    };
    print_output(&report, format)
}
