//! The [`CacheStore`] port and the two logical namespaces layered on top of
//! it. `agent-memory` depends only on this trait;
//! `agent-memory-store-cache` provides concrete backends. The cache is
//! disposable: every method here is allowed to be absent or
//! unreachable without affecting correctness, only latency.

use async_trait::async_trait;
use std::time::Duration;

/// A namespaced cache key, keeping `embed:` and `query:` entries from
/// colliding even though both are 16-byte hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Embed,
    Query,
}

impl Namespace {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Embed => "embed",
            Namespace::Query => "query",
        }
    }
}

/// Builds the storage key for a namespaced hash, e.g. `embed:<hex>`.
#[must_use]
pub fn namespaced_key(namespace: Namespace, hash: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(namespace.prefix().len() + 1 + hash.len());
    key.extend_from_slice(namespace.prefix().as_bytes());
    key.push(b':');
    key.extend_from_slice(hash);
    key
}

/// A disposable key-value cache with TTL and LRU-at-a-byte-budget eviction.
/// Implementations must be safe under a cold start: a cache
/// that is empty, unreachable, or evicts aggressively never changes the
/// *result* of a memory operation, only its latency.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetches a value if present and not expired.
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Inserts or overwrites a value with the given TTL from now.
    async fn put(&self, key: &[u8], value: Vec<u8>, ttl: Duration);

    /// Removes every entry in `namespace`, used by
    /// [`crate::memory::Memory::update_metadata`]'s "clear the collection's
    /// query-cache namespace" invalidation choice.
    async fn clear_namespace(&self, namespace: Namespace);

    /// Current cache occupancy and entry count, for `Memory::stats()`.
    async fn stats(&self) -> CacheStats;
}

/// Snapshot of cache occupancy, reported via `Memory::stats()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub used_bytes: u64,
    pub entries: u64,
}
