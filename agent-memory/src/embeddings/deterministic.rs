//! A hash-based provider used in tests and as the local-development default
//! when no provider credential is configured. It makes no network calls, so
//! cache/determinism invariants hold without any external dependency.

use super::provider::EmbeddingProvider;
use crate::error::Result;
use crate::model::{Vector, EMBEDDING_DIMENSION};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Embeds text by hashing it into a deterministic, fixed-dimension vector.
///
/// Not a semantic embedding: similarity here is statistical noise, useful
/// only for exercising the memory layer's plumbing and cache behavior. The
/// invoice/feed-publisher graphs are scored on their own domain rules, so
/// this provider is sufficient for every scenario in spec §8 that does not
/// require real language understanding.
pub struct DeterministicEmbeddingProvider {
    dimension: usize,
}

impl DeterministicEmbeddingProvider {
    #[must_use]
    pub fn new() -> Self {
        Self { dimension: EMBEDDING_DIMENSION }
    }

    /// Builds a provider with a non-default dimension, for tests that want
    /// a smaller vector.
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vector {
        let mut vector = Vec::with_capacity(self.dimension);
        let mut counter: u32 = 0;
        while vector.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for chunk in digest.chunks(4) {
                if vector.len() >= self.dimension {
                    break;
                }
                let bytes: [u8; 4] = chunk.try_into().unwrap_or([0; 4]);
                let raw = u32::from_le_bytes(bytes);
                // Map into [-1.0, 1.0] so cosine similarity behaves sanely.
                vector.push((raw as f32 / u32::MAX as f32) * 2.0 - 1.0);
            }
            counter += 1;
        }
        vector
    }
}

impl Default for DeterministicEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "deterministic-hash-v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_yields_byte_identical_vectors() {
        let provider = DeterministicEmbeddingProvider::with_dimension(32);
        let a = provider.embed(&["hello world".to_string()]).await.unwrap();
        let b = provider.embed(&["hello world".to_string()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_text_yields_different_vectors() {
        let provider = DeterministicEmbeddingProvider::with_dimension(32);
        let a = provider.embed(&["hello".to_string()]).await.unwrap();
        let b = provider.embed(&["world".to_string()]).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn output_length_matches_input_length() {
        let provider = DeterministicEmbeddingProvider::with_dimension(8);
        let out = provider
            .embed(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.len() == 8));
    }
}
