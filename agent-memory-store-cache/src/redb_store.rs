//! Durable cache backend on `redb`, feature-gated behind `redb-backend`.
//! Grounded in the teacher's `memory-storage-redb` table/transaction shape:
//! a single key-value table, synchronous redb calls wrapped in
//! `spawn_blocking` since redb transactions are not `Send` across `.await`
//! points.

#![cfg(feature = "redb-backend")]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use agent_memory::cache::CacheStats;
use agent_memory::{CacheStore, Namespace};
use async_trait::async_trait;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

const CACHE_TABLE: TableDefinition<&[u8], (u64, &[u8])> = TableDefinition::new("cache");

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Durable, redb-backed [`CacheStore`]. Survives process restarts; still
/// treated as disposable by the memory layer above it.
pub struct RedbCacheStore {
    db: Arc<Database>,
}

impl RedbCacheStore {
    /// Opens (creating if absent) a redb file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the table cannot be
    /// created.
    pub fn open(path: &Path) -> Result<Self, redb::Error> {
        let db = Database::create(path)?;
        {
            let write_txn = db.begin_write()?;
            {
                let _ = write_txn.open_table(CACHE_TABLE)?;
            }
            write_txn.commit()?;
        }
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl CacheStore for RedbCacheStore {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let db = Arc::clone(&self.db);
        let key = key.to_vec();
        tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read().ok()?;
            let table = read_txn.open_table(CACHE_TABLE).ok()?;
            let guard = table.get(key.as_slice()).ok().flatten()?;
            let (expires_at_ms, value) = guard.value();
            if expires_at_ms != 0 && now_ms() >= expires_at_ms {
                return None;
            }
            Some(value.to_vec())
        })
        .await
        .ok()
        .flatten()
    }

    async fn put(&self, key: &[u8], value: Vec<u8>, ttl: Duration) {
        let db = Arc::clone(&self.db);
        let key = key.to_vec();
        let expires_at_ms = now_ms() + ttl.as_millis() as u64;
        let _ = tokio::task::spawn_blocking(move || -> Result<(), redb::Error> {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(CACHE_TABLE)?;
                table.insert(key.as_slice(), (expires_at_ms, value.as_slice()))?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await;
    }

    async fn clear_namespace(&self, namespace: Namespace) {
        let db = Arc::clone(&self.db);
        let prefix = format!("{}:", namespace.prefix()).into_bytes();
        let _ = tokio::task::spawn_blocking(move || -> Result<(), redb::Error> {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(CACHE_TABLE)?;
                let stale: Vec<Vec<u8>> = table
                    .iter()?
                    .filter_map(|r| r.ok())
                    .filter(|(k, _)| k.value().starts_with(prefix.as_slice()))
                    .map(|(k, _)| k.value().to_vec())
                    .collect();
                for key in stale {
                    table.remove(key.as_slice())?;
                }
            }
            write_txn.commit()?;
            Ok(())
        })
        .await;
    }

    async fn stats(&self) -> CacheStats {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read().ok()?;
            let table = read_txn.open_table(CACHE_TABLE).ok()?;
            let entries = table.len().ok()?;
            let used_bytes = table
                .iter()
                .ok()?
                .filter_map(|r| r.ok())
                .map(|(k, v)| (k.value().len() + v.value().1.len()) as u64)
                .sum();
            Some(CacheStats { used_bytes, entries })
        })
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
    }
}
