//! The default development/test backend: an in-process, lock-guarded store.
//! Grounded in the same "store is the system of record, brute-force cosine
//! scan" shape the teacher's redb cache backend uses for its embedding
//! search path, generalized from episode embeddings to arbitrary
//! collections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use agent_memory::{Collection, Document, FilterExpr, MemoryError, Payload, Result, ScoredDocument, VectorStore};
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::similarity::cosine_similarity;

struct CollectionState {
    schema: Collection,
    documents: HashMap<u64, Document>,
    next_id: AtomicU64,
}

impl CollectionState {
    fn new(schema: Collection) -> Self {
        Self { schema, documents: HashMap::new(), next_id: AtomicU64::new(1) }
    }
}

/// An in-memory [`VectorStore`]. Not durable across process restarts; the
/// default backend for local development and the backend every unit test in
/// this workspace runs against.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, CollectionState>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, collection: &Collection) -> Result<()> {
        let mut collections = self.collections.write();
        collections
            .entry(collection.name.clone())
            .or_insert_with(|| CollectionState::new(collection.clone()));
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        vector: Vec<f32>,
        payload: Payload,
        content_hash: [u8; 32],
    ) -> Result<u64> {
        let mut collections = self.collections.write();
        let state = collections
            .get_mut(collection)
            .ok_or_else(|| MemoryError::NotFound(format!("collection `{collection}` not initialized")))?;
        if vector.len() != state.schema.dimension {
            return Err(StoreError::DimensionMismatch {
                collection: collection.to_string(),
                expected: state.schema.dimension,
                actual: vector.len(),
            }
            .into());
        }
        let id = state.next_id.fetch_add(1, Ordering::SeqCst);
        state.documents.insert(
            id,
            Document {
                id,
                vector,
                payload,
                content_hash,
                schema_version: agent_memory::model::DOCUMENT_SCHEMA_VERSION,
                deleted: false,
            },
        );
        Ok(id)
    }

    async fn insert_batch(
        &self,
        collection: &str,
        items: Vec<(Vec<f32>, Payload, [u8; 32])>,
    ) -> Result<Vec<u64>> {
        let mut collections = self.collections.write();
        let state = collections
            .get_mut(collection)
            .ok_or_else(|| MemoryError::NotFound(format!("collection `{collection}` not initialized")))?;
        // Validate every row before writing any of them: all-or-nothing.
        for (vector, _, _) in &items {
            if vector.len() != state.schema.dimension {
                return Err(StoreError::DimensionMismatch {
                    collection: collection.to_string(),
                    expected: state.schema.dimension,
                    actual: vector.len(),
                }
                .into());
            }
        }
        let mut ids = Vec::with_capacity(items.len());
        for (vector, payload, content_hash) in items {
            let id = state.next_id.fetch_add(1, Ordering::SeqCst);
            state.documents.insert(
                id,
                Document {
                    id,
                    vector,
                    payload,
                    content_hash,
                    schema_version: agent_memory::model::DOCUMENT_SCHEMA_VERSION,
                    deleted: false,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        top_k: usize,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>> {
        let collections = self.collections.read();
        let Some(state) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut scored: Vec<ScoredDocument> = state
            .documents
            .values()
            .filter(|doc| !doc.deleted)
            .filter(|doc| filter.is_none_or(|f| f.matches(&doc.payload)))
            .map(|doc| ScoredDocument {
                id: doc.id,
                score: cosine_similarity(query_vector, &doc.vector),
                payload: doc.payload.clone(),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn update_metadata(&self, collection: &str, id: u64, updates: Payload) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(state) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let schema = state.schema.clone();
        let Some(doc) = state.documents.get_mut(&id) else {
            return Ok(false);
        };
        if doc.deleted {
            return Ok(false);
        }
        let mut merged = doc.payload.clone();
        for (k, v) in updates {
            merged.insert(k, v);
        }
        schema.validate(&merged).map_err(MemoryError::SchemaViolation)?;
        doc.payload = merged;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(state) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match state.documents.get_mut(&id) {
            Some(doc) if !doc.deleted => {
                doc.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get(&self, collection: &str, id: u64) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|state| state.documents.get(&id))
            .filter(|doc| !doc.deleted)
            .cloned())
    }

    async fn collection_counts(&self) -> Result<Vec<(String, u64)>> {
        let collections = self.collections.read();
        Ok(collections
            .iter()
            .map(|(name, state)| {
                let count = state.documents.values().filter(|d| !d.deleted).count() as u64;
                (name.clone(), count)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_memory::Scalar;

    fn invoices() -> Collection {
        Collection::well_known("invoices").unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection(&invoices()).await.unwrap();
        let mut payload = Payload::new();
        payload.insert("vendor_name".into(), Scalar::Str("SNCB".into()));
        let id = store
            .insert("invoices", vec![1.0; 1536], payload, [0u8; 32])
            .await
            .unwrap();
        let doc = store.get("invoices", id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
    }

    #[tokio::test]
    async fn delete_tombstones_and_excludes_from_search() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection(&invoices()).await.unwrap();
        let id = store
            .insert("invoices", vec![1.0; 1536], Payload::new(), [0u8; 32])
            .await
            .unwrap();
        assert!(store.delete("invoices", id).await.unwrap());
        assert!(store.get("invoices", id).await.unwrap().is_none());
        let results = store.search("invoices", &[1.0; 1536], 10, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_orders_by_score_desc_then_id_asc() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection(&invoices()).await.unwrap();
        // Two documents with an identical vector tie on score; lower id must sort first.
        let id_a = store.insert("invoices", vec![1.0; 1536], Payload::new(), [0u8; 32]).await.unwrap();
        let id_b = store.insert("invoices", vec![1.0; 1536], Payload::new(), [1u8; 32]).await.unwrap();
        let results = store.search("invoices", &[1.0; 1536], 10, None).await.unwrap();
        assert_eq!(results[0].id, id_a.min(id_b));
        assert_eq!(results[1].id, id_a.max(id_b));
    }

    #[tokio::test]
    async fn insert_batch_rejects_dimension_mismatch_atomically() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection(&invoices()).await.unwrap();
        let items = vec![
            (vec![1.0; 1536], Payload::new(), [0u8; 32]),
            (vec![1.0; 8], Payload::new(), [1u8; 32]),
        ];
        assert!(store.insert_batch("invoices", items).await.is_err());
        let counts = store.collection_counts().await.unwrap();
        assert_eq!(counts[0].1, 0, "a rejected batch must not partially write");
    }
}
