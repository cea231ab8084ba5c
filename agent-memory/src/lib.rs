//! `agent-memory`: C1 embedding provider + C2 two-tier semantic memory layer.
//!
//! This crate defines the ports (`EmbeddingProvider`, `VectorStore`,
//! `CacheStore`) and the `Memory` facade that composes them into the six
//! operations spec §4.2 names. Concrete backends live in
//! `agent-memory-store-vector` and `agent-memory-store-cache`; this crate
//! never depends on them, only on their trait contracts, so the memory
//! layer can be exercised in tests against in-memory fakes.

pub mod cache;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod filter;
pub mod hashing;
pub mod health;
pub mod memory;
pub mod model;
pub mod retry;
pub mod store;
pub mod telemetry;

pub use cache::{CacheStore, Namespace};
pub use config::{MemoryConfig, MemoryConfigBuilder};
pub use embeddings::provider::EmbeddingProvider;
pub use error::{Kind, MemoryError, Result};
pub use filter::FilterExpr;
pub use health::{noop_health_sink, HealthSink, NoopHealthSink};
pub use memory::{Memory, MemoryStats, SaveItem};
pub use model::{Collection, Document, FieldType, Payload, Scalar, Vector};
pub use store::{ScoredDocument, VectorStore};
