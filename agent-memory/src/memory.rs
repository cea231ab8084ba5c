//! [`Memory`]: the unified C2 memory-layer facade.
//!
//! Wires an [`EmbeddingProvider`], a [`VectorStore`] (system of record), and
//! a [`CacheStore`] (disposable) into the six operations spec §4.2 names.
//! The cache is consulted with a two-phase-commit shape: phase 1 writes the
//! cache, phase 2 writes the vector store; phase-2 failure surfaces
//! `Transient` and never rolls back phase 1, since a stale cache entry is
//! within the accepted staleness budget.

use std::sync::Arc;

use crate::cache::{namespaced_key, CacheStore, Namespace};
use crate::config::MemoryConfig;
use crate::embeddings::provider::{truncate_to_token_budget, EmbeddingProvider};
use crate::error::{Kind, MemoryError, Result};
use crate::filter::FilterExpr;
use crate::hashing::{content_hash, embed_cache_key, query_cache_key};
use crate::health::{noop_health_sink, HealthSink};
use crate::model::{Collection, Payload, Vector};
use crate::store::{ScoredDocument, VectorStore};
use crate::telemetry::MemoryTelemetry;

/// Reports `result` against `sink` under `component`'s name: healthy on
/// `Ok`, degraded for a retryable `Kind` (the backend may recover on its
/// own), down otherwise.
fn report<T>(sink: &dyn HealthSink, component: &str, result: &Result<T>) {
    match result {
        Ok(_) => sink.record_healthy(component),
        Err(err) if err.is_retryable() => sink.record_degraded(component),
        Err(err) if err.kind() == Kind::SchemaViolation || err.kind() == Kind::NotFound => {
            // Caller error, not a backend-health signal.
        }
        Err(_) => sink.record_down(component),
    }
}

/// One item in a [`Memory::batch_save`] call.
#[derive(Debug, Clone)]
pub struct SaveItem {
    pub content: String,
    pub metadata: Payload,
}

/// Aggregate stats returned by [`Memory::stats`].
#[derive(Debug, Clone)]
pub struct MemoryStats {
    pub cache_hit_rate: f64,
    pub cache_used_bytes: u64,
    pub cache_entries: u64,
    pub collections: Vec<(String, u64)>,
    pub embeddings_generated: u64,
    pub embeddings_cached_fraction: f64,
}

/// The C2 memory-layer facade.
pub struct Memory {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    cache: Arc<dyn CacheStore>,
    config: MemoryConfig,
    telemetry: MemoryTelemetry,
    health: Arc<dyn HealthSink>,
}

impl Memory {
    #[must_use]
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        cache: Arc<dyn CacheStore>,
        config: MemoryConfig,
    ) -> Self {
        Self {
            provider,
            store,
            cache,
            config,
            telemetry: MemoryTelemetry::default(),
            health: noop_health_sink(),
        }
    }

    /// Swaps in a real [`HealthSink`] (e.g. `agent-tools`'s `AgentMonitor`)
    /// so `embedding_provider`/`vector_store` health reflects this
    /// instance's actual call outcomes rather than staying silently
    /// healthy forever.
    #[must_use]
    pub fn with_health_sink(mut self, sink: Arc<dyn HealthSink>) -> Self {
        self.health = sink;
        self
    }

    fn resolve_collection(name: &str) -> Result<Collection> {
        Collection::well_known(name)
            .ok_or_else(|| MemoryError::NotFound(format!("unknown collection `{name}`")))
    }

    /// Embeds one piece of text, consulting and populating the `embed:`
    /// cache namespace (write-through: spec §4.2).
    async fn embed_one_cached(&self, text: &str) -> Result<Vector> {
        let (truncated, was_truncated) = truncate_to_token_budget(text);
        if was_truncated {
            tracing::warn!(original_len = text.len(), "text truncated to embedding token budget");
        }
        let key = embed_cache_key(self.provider.model_name(), &truncated);
        let cache_key = namespaced_key(Namespace::Embed, &key);
        if let Some(bytes) = self.cache.get(&cache_key).await {
            if let Ok(vector) = postcard::from_bytes::<Vector>(&bytes) {
                self.telemetry.cache_hits.incr();
                self.telemetry.embeddings_from_cache.incr();
                return Ok(vector);
            }
        }
        self.telemetry.cache_misses.incr();
        let result = self.provider.embed(std::slice::from_ref(&truncated)).await;
        report(self.health.as_ref(), "embedding_provider", &result);
        let vectors = result?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Internal("embedding provider returned no vector".into()))?;
        self.telemetry.embeddings_generated.incr();
        if let Ok(bytes) = postcard::to_allocvec(&vector) {
            self.cache.put(&cache_key, bytes, self.config.embedding_cache_ttl).await;
        }
        Ok(vector)
    }

    async fn embed_batch_cached(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut out = Vec::with_capacity(texts.len());
        let mut to_fetch = Vec::new();
        let mut to_fetch_idx = Vec::new();
        let mut keys = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            let (truncated, was_truncated) = truncate_to_token_budget(text);
            if was_truncated {
                tracing::warn!(index = i, "text truncated to embedding token budget");
            }
            let key = embed_cache_key(self.provider.model_name(), &truncated);
            let cache_key = namespaced_key(Namespace::Embed, &key);
            if let Some(bytes) = self.cache.get(&cache_key).await {
                if let Ok(vector) = postcard::from_bytes::<Vector>(&bytes) {
                    self.telemetry.cache_hits.incr();
                    self.telemetry.embeddings_from_cache.incr();
                    out.push(Some(vector));
                    keys.push(cache_key);
                    continue;
                }
            }
            self.telemetry.cache_misses.incr();
            out.push(None);
            to_fetch.push(truncated);
            to_fetch_idx.push(i);
            keys.push(cache_key);
        }
        if !to_fetch.is_empty() {
            let result = self.provider.embed_batch(&to_fetch).await;
            report(self.health.as_ref(), "embedding_provider", &result);
            let fetched = result?;
            for (pos, idx) in to_fetch_idx.into_iter().enumerate() {
                let vector = fetched.get(pos).cloned().ok_or_else(|| {
                    MemoryError::Internal("embedding provider batch length mismatch".into())
                })?;
                self.telemetry.embeddings_generated.incr();
                if let Ok(bytes) = postcard::to_allocvec(&vector) {
                    self.cache.put(&keys[idx], bytes, self.config.embedding_cache_ttl).await;
                }
                out[idx] = Some(vector);
            }
        }
        out.into_iter()
            .map(|v| v.ok_or_else(|| MemoryError::Internal("missing embedding in batch".into())))
            .collect()
    }

    /// Generates an embedding, writes it to the vector store, and returns
    /// the assigned id.
    ///
    /// # Errors
    /// Returns `SchemaViolation` if `metadata` violates the collection's
    /// declared schema, `EmbeddingFailed` on provider failure, or
    /// `StoreUnavailable` if the vector store rejects the write.
    pub async fn save(&self, collection: &str, content: &str, metadata: Payload) -> Result<u64> {
        let schema = Self::resolve_collection(collection)?;
        schema.validate(&metadata).map_err(MemoryError::SchemaViolation)?;
        self.store.ensure_collection(&schema).await?;
        let vector = self.embed_one_cached(content).await?;
        let hash = content_hash(content);
        let result = self.store.insert(collection, vector, metadata, hash).await;
        report(self.health.as_ref(), "vector_store", &result);
        result
    }

    /// Embeds and upserts every item in one batch call; all-or-nothing.
    ///
    /// # Errors
    /// Returns `SchemaViolation` if any item's metadata violates the
    /// collection's declared schema, without writing any item. Otherwise
    /// propagates embedding/store failures.
    pub async fn batch_save(&self, collection: &str, items: Vec<SaveItem>) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }
        let schema = Self::resolve_collection(collection)?;
        for item in &items {
            schema.validate(&item.metadata).map_err(MemoryError::SchemaViolation)?;
        }
        self.store.ensure_collection(&schema).await?;
        let texts: Vec<String> = items.iter().map(|i| i.content.clone()).collect();
        let vectors = self.embed_batch_cached(&texts).await?;
        let rows = items
            .into_iter()
            .zip(vectors)
            .map(|(item, vector)| {
                let hash = content_hash(&item.content);
                (vector, item.metadata, hash)
            })
            .collect();
        let result = self.store.insert_batch(collection, rows).await;
        report(self.health.as_ref(), "vector_store", &result);
        Ok(result?.len())
    }

    /// Cache-first semantic search. Results are sorted by score
    /// descending, ties broken by `id` ascending; `filters` are
    /// applied inside the vector store so `top_k` reflects only matching
    /// documents (spec testable property 4).
    ///
    /// # Errors
    /// Propagates embedding and vector-store failures.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        Self::resolve_collection(collection)?;
        let filter_repr = filter.map(|f| format!("{f:?}")).unwrap_or_default();
        let key = query_cache_key(collection, query, &filter_repr, top_k);
        let cache_key = namespaced_key(Namespace::Query, &key);
        if let Some(bytes) = self.cache.get(&cache_key).await {
            if let Ok(results) = postcard::from_bytes::<Vec<ScoredDocument>>(&bytes) {
                self.telemetry.cache_hits.incr();
                return Ok(results);
            }
        }
        self.telemetry.cache_misses.incr();
        let vector = self.embed_one_cached(query).await?;
        let result = self.store.search(collection, &vector, top_k, filter).await;
        report(self.health.as_ref(), "vector_store", &result);
        let mut results = result?;
        sort_results(&mut results);
        if let Ok(bytes) = postcard::to_allocvec(&results) {
            self.cache.put(&cache_key, bytes, self.config.query_cache_ttl).await;
        }
        Ok(results)
    }

    /// Partially updates a document's metadata without re-embedding;
    /// invalidates the collection's `query:` cache namespace so subsequent
    /// searches are not served stale results beyond the TTL budget (spec
    /// §4.2's "either clear the collection's query-cache namespace or rely
    /// on TTL" — this implementation does both).
    ///
    /// # Errors
    /// Propagates vector-store failures.
    pub async fn update_metadata(&self, collection: &str, id: u64, updates: Payload) -> Result<bool> {
        Self::resolve_collection(collection)?;
        let result = self.store.update_metadata(collection, id, updates).await;
        report(self.health.as_ref(), "vector_store", &result);
        let updated = result?;
        if updated {
            self.cache.clear_namespace(Namespace::Query).await;
        }
        Ok(updated)
    }

    /// Tombstones a document. Does not invalidate the query cache; the TTL
    /// bounds staleness.
    ///
    /// # Errors
    /// Propagates vector-store failures.
    pub async fn delete(&self, collection: &str, id: u64) -> Result<bool> {
        Self::resolve_collection(collection)?;
        let result = self.store.delete(collection, id).await;
        report(self.health.as_ref(), "vector_store", &result);
        result
    }

    /// Aggregate cache/collection/embedding statistics.
    ///
    /// # Errors
    /// Propagates vector-store failures when listing collection counts.
    pub async fn stats(&self) -> Result<MemoryStats> {
        let cache_stats = self.cache.stats().await;
        let result = self.store.collection_counts().await;
        report(self.health.as_ref(), "vector_store", &result);
        let collections = result?;
        Ok(MemoryStats {
            cache_hit_rate: self.telemetry.hit_rate(),
            cache_used_bytes: cache_stats.used_bytes,
            cache_entries: cache_stats.entries,
            collections,
            embeddings_generated: self.telemetry.embeddings_generated.get(),
            embeddings_cached_fraction: self.telemetry.cached_fraction(),
        })
    }
}

fn sort_results(results: &mut [ScoredDocument]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}
