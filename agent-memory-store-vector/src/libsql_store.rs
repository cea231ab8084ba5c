//! Durable vector store backed by libSQL/Turso, feature-gated behind
//! `libsql-backend`. Grounded in the teacher's `memory-storage-turso`
//! connection and row-mapping style: open a `Database`, pull one
//! `Connection` per call, map SQL errors into the shared error taxonomy at
//! the boundary. Search is a brute-force cosine scan over the collection's
//! non-tombstoned rows, the same shape the teacher's redb backend uses for
//! embedding search — libSQL has no native ANN index in this stack.

#![cfg(feature = "libsql-backend")]

use std::collections::BTreeMap;

use agent_memory::model::DOCUMENT_SCHEMA_VERSION;
use agent_memory::{Collection, Document, FilterExpr, MemoryError, Payload, Result, Scalar, ScoredDocument, VectorStore};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database};

use crate::error::StoreError;
use crate::similarity::cosine_similarity;

/// Durable libSQL-backed [`VectorStore`].
pub struct LibsqlVectorStore {
    db: Database,
}

impl LibsqlVectorStore {
    /// Opens (creating if absent) a local libSQL file database and runs
    /// schema migration. `path` may be `:memory:` for ephemeral use in
    /// integration tests.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` if the database cannot be opened or the
    /// schema cannot be created.
    pub async fn open(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self { db };
        store.migrate().await?;
        Ok(store)
    }

    async fn connection(&self) -> Result<Connection> {
        self.db.connect().map_err(|e| StoreError::Unavailable(e.to_string()).into())
    }

    async fn migrate(&self) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id INTEGER NOT NULL,
                vector BLOB NOT NULL,
                payload TEXT NOT NULL,
                content_hash BLOB NOT NULL,
                schema_version INTEGER NOT NULL,
                deleted INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (collection, id)
            );
            CREATE TABLE IF NOT EXISTS collection_seq (
                collection TEXT PRIMARY KEY,
                next_id INTEGER NOT NULL
            );
            ",
        )
        .await
        .map_err(|e| StoreError::Unavailable(format!("schema migration failed: {e}")))?;
        Ok(())
    }

    async fn next_id(&self, conn: &Connection, collection: &str) -> Result<u64> {
        conn.execute(
            "INSERT INTO collection_seq (collection, next_id) VALUES (?1, 1)
             ON CONFLICT(collection) DO UPDATE SET next_id = next_id + 1",
            libsql::params![collection],
        )
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut rows = conn
            .query(
                "SELECT next_id FROM collection_seq WHERE collection = ?1",
                libsql::params![collection],
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .ok_or_else(|| StoreError::Corrupt("collection_seq row vanished".into()))?;
        let id: i64 = row.get(0).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(id as u64)
    }

    fn encode_vector(vector: &[f32]) -> Vec<u8> {
        vector.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn decode_vector(bytes: &[u8]) -> Vec<f32> {
        bytes.chunks_exact(4).map(|c| f32::from_le_bytes(c.try_into().unwrap_or([0; 4]))).collect()
    }

    fn encode_payload(payload: &Payload) -> Result<String> {
        serde_json::to_string(payload).map_err(|e| StoreError::Corrupt(e.to_string()).into())
    }

    fn decode_payload(text: &str) -> Result<Payload> {
        serde_json::from_str::<BTreeMap<String, Scalar>>(text)
            .map_err(|e| StoreError::Corrupt(e.to_string()).into())
    }
}

#[async_trait]
impl VectorStore for LibsqlVectorStore {
    async fn ensure_collection(&self, _collection: &Collection) -> Result<()> {
        // Schema is enforced by `Collection::validate` before rows reach this
        // store; the `documents` table is shared across collections and
        // already migrated in `open`.
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        vector: Vec<f32>,
        payload: Payload,
        content_hash: [u8; 32],
    ) -> Result<u64> {
        let conn = self.connection().await?;
        let id = self.next_id(&conn, collection).await?;
        conn.execute(
            "INSERT INTO documents (collection, id, vector, payload, content_hash, schema_version, deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
            libsql::params![
                collection,
                id as i64,
                Self::encode_vector(&vector),
                Self::encode_payload(&payload)?,
                content_hash.to_vec(),
                i64::from(DOCUMENT_SCHEMA_VERSION),
            ],
        )
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(id)
    }

    async fn insert_batch(
        &self,
        collection: &str,
        items: Vec<(Vec<f32>, Payload, [u8; 32])>,
    ) -> Result<Vec<u64>> {
        let mut ids = Vec::with_capacity(items.len());
        for (vector, payload, hash) in items {
            ids.push(self.insert(collection, vector, payload, hash).await?);
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
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, vector, payload FROM documents WHERE collection = ?1 AND deleted = 0",
                libsql::params![collection],
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut scored = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| StoreError::Unavailable(e.to_string()))? {
            let id: i64 = row.get(0).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let vector_bytes: Vec<u8> = row.get(1).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let payload_text: String = row.get(2).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let payload = Self::decode_payload(&payload_text)?;
            if filter.is_some_and(|f| !f.matches(&payload)) {
                continue;
            }
            let vector = Self::decode_vector(&vector_bytes);
            scored.push(ScoredDocument { id: id as u64, score: cosine_similarity(query_vector, &vector), payload });
        }
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
        let Some(mut doc) = self.get(collection, id).await? else {
            return Ok(false);
        };
        for (k, v) in updates {
            doc.payload.insert(k, v);
        }
        let conn = self.connection().await?;
        let affected = conn
            .execute(
                "UPDATE documents SET payload = ?1 WHERE collection = ?2 AND id = ?3 AND deleted = 0",
                libsql::params![Self::encode_payload(&doc.payload)?, collection, id as i64],
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(affected > 0)
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<bool> {
        let conn = self.connection().await?;
        let affected = conn
            .execute(
                "UPDATE documents SET deleted = 1 WHERE collection = ?1 AND id = ?2 AND deleted = 0",
                libsql::params![collection, id as i64],
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(affected > 0)
    }

    async fn get(&self, collection: &str, id: u64) -> Result<Option<Document>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT vector, payload, content_hash, schema_version FROM documents
                 WHERE collection = ?1 AND id = ?2 AND deleted = 0",
                libsql::params![collection, id as i64],
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let Some(row) = rows.next().await.map_err(|e| StoreError::Unavailable(e.to_string()))? else {
            return Ok(None);
        };
        let vector_bytes: Vec<u8> = row.get(0).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let payload_text: String = row.get(1).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let content_hash: Vec<u8> = row.get(2).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let schema_version: i64 = row.get(3).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let mut hash = [0u8; 32];
        let n = content_hash.len().min(32);
        hash[..n].copy_from_slice(&content_hash[..n]);
        Ok(Some(Document {
            id,
            vector: Self::decode_vector(&vector_bytes),
            payload: Self::decode_payload(&payload_text)?,
            content_hash: hash,
            schema_version: schema_version as u16,
            deleted: false,
        }))
    }

    async fn collection_counts(&self) -> Result<Vec<(String, u64)>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT collection, COUNT(*) FROM documents WHERE deleted = 0 GROUP BY collection",
                (),
            )
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| StoreError::Unavailable(e.to_string()))? {
            let name: String = row.get(0).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let count: i64 = row.get(1).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            out.push((name, count as u64));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_memory::Collection;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = LibsqlVectorStore::open(":memory:").await.unwrap();
        store.ensure_collection(&Collection::well_known("invoices").unwrap()).await.unwrap();
        let id = store.insert("invoices", vec![1.0, 0.0], Payload::new(), [7u8; 32]).await.unwrap();
        let doc = store.get("invoices", id).await.unwrap().unwrap();
        assert_eq!(doc.vector, vec![1.0, 0.0]);
    }
}
