//! Exercises the memory activities against real (in-memory) backends end to
//! end, confirming they behave exactly like direct `Memory` calls plus the
//! activity-layer error mapping.

use std::sync::Arc;

use agent_activities::{Activity, ActivityContext, MemorySaveActivity, MemorySearchActivity, SaveInput, SearchInput};
use agent_memory::embeddings::deterministic::DeterministicEmbeddingProvider;
use agent_memory::{Memory, MemoryConfig, Payload, Scalar};
use agent_memory_store_cache::InMemoryCacheStore;
use agent_memory_store_vector::InMemoryVectorStore;

fn test_memory() -> Arc<Memory> {
    Arc::new(Memory::new(
        Arc::new(DeterministicEmbeddingProvider::new()),
        Arc::new(InMemoryVectorStore::default()),
        Arc::new(InMemoryCacheStore::with_default_budget()),
        MemoryConfig::default(),
    ))
}

#[tokio::test]
async fn save_then_search_round_trips_through_activities() {
    let memory = test_memory();
    let save = MemorySaveActivity::new(Arc::clone(&memory));
    let search = MemorySearchActivity::new(Arc::clone(&memory));
    let ctx = ActivityContext::new("test-save-1");

    let mut metadata = Payload::new();
    metadata.insert("vendor_name".to_string(), Scalar::Str("SNCB".to_string()));
    metadata.insert("amount".to_string(), Scalar::Float(42.0));
    metadata.insert(
        "date".to_string(),
        Scalar::Date(chrono::NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")),
    );
    metadata.insert("matched".to_string(), Scalar::Bool(false));

    let id = save
        .run(
            &ctx,
            SaveInput {
                collection: "invoices".to_string(),
                content: "SNCB train ticket".to_string(),
                metadata,
            },
        )
        .await
        .expect("save succeeds");

    let results = search
        .run(
            &ctx,
            SearchInput {
                collection: "invoices".to_string(),
                query: "SNCB train ticket".to_string(),
                top_k: 5,
                filter: None,
            },
        )
        .await
        .expect("search succeeds");

    assert!(results.iter().any(|r| r.id == id));
}
