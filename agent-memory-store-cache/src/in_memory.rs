//! Default development/test cache backend: an in-process LRU keyed on the
//! namespaced byte key, evicting at a configurable byte budget. Grounded in
//! the shape of the teacher's `memory-storage-redb::cache::LRUCache`
//! (capacity-bounded, access-recording), generalized from episode ids to
//! arbitrary namespaced byte keys and from entry-count to byte-budget
//! eviction.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use agent_memory::{CacheStore, Namespace};
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn byte_len(&self, key_len: usize) -> u64 {
        (self.value.len() + key_len) as u64
    }
}

struct Inner {
    entries: LruCache<Vec<u8>, Entry>,
    used_bytes: u64,
    byte_budget: u64,
}

/// In-memory [`CacheStore`]. Every operation here may be skipped entirely
/// so
/// this implementation favors simplicity over sophistication.
pub struct InMemoryCacheStore {
    inner: Mutex<Inner>,
}

impl InMemoryCacheStore {
    /// `byte_budget` is the LRU eviction threshold (spec default 512 MiB).
    #[must_use]
    pub fn new(byte_budget: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                // Unbounded by entry count; eviction is driven by `byte_budget`.
                entries: LruCache::new(NonZeroUsize::new(10_000_000).expect("nonzero")),
                used_bytes: 0,
                byte_budget,
            }),
        }
    }

    #[must_use]
    pub fn with_default_budget() -> Self {
        Self::new(512 * 1024 * 1024)
    }

    fn evict_until_within_budget(inner: &mut Inner) {
        while inner.used_bytes > inner.byte_budget {
            let Some((key, entry)) = inner.entries.pop_lru() else { break };
            inner.used_bytes = inner.used_bytes.saturating_sub(entry.byte_len(key.len()));
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::with_default_budget()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let mut inner = self.inner.lock();
        let expired = inner.entries.get(key).is_some_and(Entry::is_expired);
        if expired {
            if let Some(entry) = inner.entries.pop(key) {
                inner.used_bytes = inner.used_bytes.saturating_sub(entry.byte_len(key.len()));
            }
            return None;
        }
        inner.entries.get(key).map(|e| e.value.clone())
    }

    async fn put(&self, key: &[u8], value: Vec<u8>, ttl: Duration) {
        let mut inner = self.inner.lock();
        let entry = Entry { value, expires_at: Instant::now() + ttl };
        let added = entry.byte_len(key.len());
        if let Some(old) = inner.entries.put(key.to_vec(), entry) {
            inner.used_bytes = inner.used_bytes.saturating_sub(old.byte_len(key.len()));
        }
        inner.used_bytes += added;
        Self::evict_until_within_budget(&mut inner);
    }

    async fn clear_namespace(&self, namespace: Namespace) {
        let mut inner = self.inner.lock();
        let prefix = format!("{}:", namespace.prefix()).into_bytes();
        let stale: Vec<Vec<u8>> = inner
            .entries
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in stale {
            if let Some(entry) = inner.entries.pop(&key) {
                inner.used_bytes = inner.used_bytes.saturating_sub(entry.byte_len(key.len()));
            }
        }
    }

    async fn stats(&self) -> agent_memory::cache::CacheStats {
        let inner = self.inner.lock();
        agent_memory::cache::CacheStats {
            used_bytes: inner.used_bytes,
            entries: inner.entries.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_memory::cache::namespaced_key;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = InMemoryCacheStore::with_default_budget();
        let key = namespaced_key(Namespace::Embed, b"abc");
        cache.put(&key, b"hello".to_vec(), Duration::from_secs(60)).await;
        assert_eq!(cache.get(&key).await, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn expired_entry_is_not_returned() {
        let cache = InMemoryCacheStore::with_default_budget();
        let key = namespaced_key(Namespace::Query, b"abc");
        cache.put(&key, b"hi".to_vec(), Duration::from_millis(1)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test]
    async fn eviction_respects_byte_budget() {
        let cache = InMemoryCacheStore::new(10);
        let k1 = namespaced_key(Namespace::Embed, b"1");
        let k2 = namespaced_key(Namespace::Embed, b"2");
        cache.put(&k1, vec![0u8; 8], Duration::from_secs(60)).await;
        cache.put(&k2, vec![0u8; 8], Duration::from_secs(60)).await;
        let stats = cache.stats().await;
        assert!(stats.used_bytes <= 10, "eviction must keep usage within budget");
    }

    #[tokio::test]
    async fn clear_namespace_only_removes_matching_prefix() {
        let cache = InMemoryCacheStore::with_default_budget();
        let embed_key = namespaced_key(Namespace::Embed, b"1");
        let query_key = namespaced_key(Namespace::Query, b"1");
        cache.put(&embed_key, b"e".to_vec(), Duration::from_secs(60)).await;
        cache.put(&query_key, b"q".to_vec(), Duration::from_secs(60)).await;
        cache.clear_namespace(Namespace::Query).await;
        assert_eq!(cache.get(&embed_key).await, Some(b"e".to_vec()));
        assert_eq!(cache.get(&query_key).await, None);
    }
}
