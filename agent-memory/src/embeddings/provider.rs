//! The [`EmbeddingProvider`] contract.

use crate::error::{MemoryError, Result};
use crate::model::Vector;
use async_trait::async_trait;

/// Maximum input tokens per text; longer texts are truncated by the caller
/// before reaching a provider. Approximated as UTF-8 bytes / 4
/// for providers that do not expose a tokenizer.
pub const MAX_INPUT_TOKENS: usize = 8191;

/// Maximum texts batched into a single underlying provider call; larger
/// batches are chunked by [`embed_batch`](EmbeddingProvider::embed_batch)'s
/// default implementation.
pub const MAX_BATCH_SIZE: usize = 100;

/// Converts text into fixed-dimension vectors.
///
/// Implementors must guarantee determinism: the same `(model_name, text)`
/// pair always yields byte-identical output, since the memory layer's cache
/// key is derived from exactly that pair.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts in one underlying call. `texts.len()` must be
    /// `<= MAX_BATCH_SIZE`; callers needing more use [`embed_batch`].
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Embeds an arbitrarily large batch, chunking into
    /// [`MAX_BATCH_SIZE`]-sized calls to [`embed`](Self::embed).
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_BATCH_SIZE) {
            out.extend(self.embed(chunk).await?);
        }
        Ok(out)
    }

    /// The fixed output dimension this provider produces.
    fn embedding_dimension(&self) -> usize;

    /// Stable model identifier, used as part of the cache key.
    fn model_name(&self) -> &str;

    /// Whether the provider currently believes it can serve requests (e.g.
    /// its circuit breaker is closed). Advisory only; `embed` still may fail.
    async fn is_available(&self) -> bool {
        true
    }

    /// Optional warmup hook (e.g. opening a connection pool) called once at
    /// startup; default is a no-op.
    async fn warmup(&self) -> Result<()> {
        Ok(())
    }
}

/// Truncates `text` to at most [`MAX_INPUT_TOKENS`] tokens (approximated as
/// 4 bytes/token) and reports whether truncation occurred.
#[must_use]
pub fn truncate_to_token_budget(text: &str) -> (String, bool) {
    let max_bytes = MAX_INPUT_TOKENS * 4;
    if text.len() <= max_bytes {
        return (text.to_string(), false);
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (text[..end].to_string(), true)
}

/// Classifies a provider-level failure into the `Transient`/`Permanent`
/// split named in spec §4.1, as a prelude to building a [`MemoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailureClass {
    Transient,
    Permanent,
}

/// Builds the appropriate [`MemoryError`] for a classified provider failure.
#[must_use]
pub fn provider_error(class: ProviderFailureClass, message: impl Into<String>) -> MemoryError {
    let message = message.into();
    match class {
        ProviderFailureClass::Transient => MemoryError::EmbeddingFailed(message),
        ProviderFailureClass::Permanent => MemoryError::SchemaViolation(message),
    }
}
