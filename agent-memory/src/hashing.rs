//! Content and cache-key hashing.

use sha2::{Digest, Sha256};

/// Stable hash of a document's canonical content string, stored on
/// [`crate::model::Document`] as `content_hash`. Advisory for dedup, not a
/// uniqueness key.
#[must_use]
pub fn content_hash(content: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().into()
}

/// Embedding cache key: `sha256(model_id || "\x00" || text)[0:16]` (spec
/// §4.1).
#[must_use]
pub fn embed_cache_key(model_id: &str, text: &str) -> [u8; 16] {
    let mut hasher = Sha256::new();
    hasher.update(model_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

/// Query cache key: hash of `collection || query || filters`.
/// `filters_repr` must be a deterministic textual representation of the
/// filter (callers derive it from the `FilterExpr`'s `Debug` form, which is
/// stable for a given filter value).
#[must_use]
pub fn query_cache_key(collection: &str, query: &str, filters_repr: &str, top_k: usize) -> [u8; 16] {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_bytes());
    hasher.update([0u8]);
    hasher.update(query.as_bytes());
    hasher.update([0u8]);
    hasher.update(filters_repr.as_bytes());
    hasher.update([0u8]);
    hasher.update(top_k.to_le_bytes());
    let digest = hasher.finalize();
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_yields_same_hash() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("world"));
    }

    #[test]
    fn embed_key_depends_on_model_and_text() {
        let a = embed_cache_key("model-a", "hello");
        let b = embed_cache_key("model-b", "hello");
        assert_ne!(a, b);
    }
}
