//! The [`VectorStore`] port. `agent-memory` depends only on this trait;
//! `agent-memory-store-vector` provides the concrete backend, mirroring how
//! the teacher's core crate defines a storage trait that its backend crates
//! implement.

use crate::error::Result;
use crate::filter::FilterExpr;
use crate::model::{Collection, Document, Payload};
use async_trait::async_trait;

/// A single scored search hit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScoredDocument {
    pub id: u64,
    pub score: f32,
    pub payload: Payload,
}

/// The durable system of record for embedded documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ensures the named collection exists with the given schema, creating
    /// it on first use.
    async fn ensure_collection(&self, collection: &Collection) -> Result<()>;

    /// Inserts one document, assigning it a fresh id.
    async fn insert(
        &self,
        collection: &str,
        vector: Vec<f32>,
        payload: Payload,
        content_hash: [u8; 32],
    ) -> Result<u64>;

    /// Inserts a batch of documents in one upsert; all-or-nothing (spec
    /// §4.2: "fail the whole batch; caller retries").
    async fn insert_batch(
        &self,
        collection: &str,
        items: Vec<(Vec<f32>, Payload, [u8; 32])>,
    ) -> Result<Vec<u64>>;

    /// Cosine-similarity search, applying `filter` inside the store (not as
    /// a post-filter) so `top_k` reflects only matching documents.
    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>>;

    /// Partially updates a document's payload without re-embedding.
    async fn update_metadata(&self, collection: &str, id: u64, updates: Payload) -> Result<bool>;

    /// Tombstones a document; its id is never reused.
    async fn delete(&self, collection: &str, id: u64) -> Result<bool>;

    /// Fetches a single document by id, if present and not tombstoned.
    async fn get(&self, collection: &str, id: u64) -> Result<Option<Document>>;

    /// Live (non-tombstoned) document counts per collection.
    async fn collection_counts(&self) -> Result<Vec<(String, u64)>>;
}
