//! `agent-memory-store-vector`: [`agent_memory::VectorStore`] backends.
//!
//! [`InMemoryVectorStore`] is the default backend, used by every in-process
//! test in this workspace. [`libsql_store::LibsqlVectorStore`] is a durable
//! alternative, feature-gated behind `libsql-backend`.

pub mod error;
pub mod in_memory;
#[cfg(feature = "libsql-backend")]
pub mod libsql_store;
pub mod similarity;

pub use error::StoreError;
pub use in_memory::InMemoryVectorStore;
#[cfg(feature = "libsql-backend")]
pub use libsql_store::LibsqlVectorStore;
pub use similarity::{cosine_similarity, IndexConfig};
