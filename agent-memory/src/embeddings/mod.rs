//! Embedding provider contract (C1) and its concrete implementations.

pub mod circuit_breaker;
pub mod deterministic;
pub mod limiter;
#[cfg(feature = "mistral")]
pub mod mistral;
#[cfg(feature = "openai")]
pub mod openai;
pub mod provider;

pub use circuit_breaker::CircuitBreaker;
pub use deterministic::DeterministicEmbeddingProvider;
pub use limiter::EmbeddingLimiter;
#[cfg(feature = "mistral")]
pub use mistral::MistralEmbeddingProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAiEmbeddingProvider;
pub use provider::{truncate_to_token_budget, EmbeddingProvider, MAX_BATCH_SIZE, MAX_INPUT_TOKENS};
