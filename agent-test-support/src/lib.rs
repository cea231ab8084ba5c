//! Shared test fixtures, builders, and in-memory fakes for the
//! agent-runtime workspace.
//!
//! Every crate's own test suite builds its own narrow fakes where a single
//! trait method needs stubbing; this crate holds only the fixtures reused
//! across crate boundaries: a ready-to-use in-memory [`Memory`], sample
//! payloads for each of the four well-known collections, and activity
//! context builders.

use std::sync::Arc;
use std::time::Duration;

use agent_activities::ActivityContext;
use agent_memory::embeddings::DeterministicEmbeddingProvider;
use agent_memory::{Memory, MemoryConfig, Payload, Scalar};
use agent_memory_store_cache::InMemoryCacheStore;
use agent_memory_store_vector::InMemoryVectorStore;
use chrono::NaiveDate;

/// Builds a [`Memory`] backed entirely by in-process fakes: a
/// [`DeterministicEmbeddingProvider`], an [`InMemoryVectorStore`], and an
/// [`InMemoryCacheStore`] at the default byte budget. No network calls, no
/// filesystem state; safe to construct fresh in every test.
#[must_use]
pub fn test_memory() -> Memory {
    Memory::new(
        Arc::new(DeterministicEmbeddingProvider::new()),
        Arc::new(InMemoryVectorStore::new()),
        Arc::new(InMemoryCacheStore::with_default_budget()),
        MemoryConfig::default(),
    )
}

/// Like [`test_memory`], but with a caller-supplied config, for tests that
/// need to exercise a non-default cache budget or TTL.
#[must_use]
pub fn test_memory_with_config(config: MemoryConfig) -> Memory {
    Memory::new(
        Arc::new(DeterministicEmbeddingProvider::new()),
        Arc::new(InMemoryVectorStore::new()),
        Arc::new(InMemoryCacheStore::with_default_budget()),
        config,
    )
}

/// An [`ActivityContext`] with a random idempotency key and no deadline,
/// for tests that don't care about either.
#[must_use]
pub fn test_activity_context() -> ActivityContext {
    ActivityContext::new(uuid::Uuid::new_v4().to_string())
}

/// An [`ActivityContext`] whose deadline has already passed, for exercising
/// timeout handling.
#[must_use]
pub fn expired_activity_context() -> ActivityContext {
    ActivityContext::new(uuid::Uuid::new_v4().to_string())
        .with_deadline(chrono::Utc::now() - chrono::Duration::seconds(1))
}

/// A sample `invoices` payload.
#[must_use]
pub fn invoice_payload(vendor_name: &str, amount: f64, date: NaiveDate, matched: bool) -> Payload {
    Payload::from([
        ("vendor_name".to_string(), Scalar::Str(vendor_name.to_string())),
        ("amount".to_string(), Scalar::Float(amount)),
        ("date".to_string(), Scalar::Date(date)),
        ("matched".to_string(), Scalar::Bool(matched)),
    ])
}

/// A sample `social_posts` payload.
#[must_use]
pub fn social_post_payload(brand: &str, platform: &str, caption: &str, published: bool) -> Payload {
    Payload::from([
        ("brand".to_string(), Scalar::Str(brand.to_string())),
        ("platform".to_string(), Scalar::Str(platform.to_string())),
        ("published".to_string(), Scalar::Bool(published)),
        ("caption".to_string(), Scalar::Str(caption.to_string())),
    ])
}

/// A sample `ad_reports` payload.
#[must_use]
pub fn ad_report_payload(agent_name: &str, kind: &str) -> Payload {
    Payload::from([
        ("agent_name".to_string(), Scalar::Str(agent_name.to_string())),
        ("kind".to_string(), Scalar::Str(kind.to_string())),
    ])
}

/// A sample `agent_context` payload, matching the shape every reasoning
/// graph's `save_context`/`save_memory` node writes.
#[must_use]
pub fn agent_context_payload(agent_name: &str, context_type: &str, confidence: f64, transaction_id: &str) -> Payload {
    Payload::from([
        ("agent_name".to_string(), Scalar::Str(agent_name.to_string())),
        ("context_type".to_string(), Scalar::Str(context_type.to_string())),
        ("confidence".to_string(), Scalar::Float(confidence)),
        ("transaction_id".to_string(), Scalar::Str(transaction_id.to_string())),
    ])
}

/// A short duration safe to use as a test timeout without flaking under
/// load, longer than any in-memory fake's real latency but far shorter than
/// a human would notice.
#[must_use]
pub fn short_timeout() -> Duration {
    Duration::from_millis(200)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_round_trips_a_save_and_search() {
        let memory = test_memory();
        let date = NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date");
        let payload = invoice_payload("SNCB", 22.70, date, false);
        let id = memory.save("invoices", "SNCB invoice for 22.70 on 2025-01-03", payload).await.expect("save succeeds");
        assert!(id > 0);

        let results = memory.search("invoices", "SNCB invoice", 5, None).await.expect("search succeeds");
        assert!(results.iter().any(|doc| doc.id == id));
    }

    #[test]
    fn expired_activity_context_reports_expired() {
        let ctx = expired_activity_context();
        assert!(ctx.is_expired(chrono::Utc::now()));
    }

    #[test]
    fn agent_context_payload_matches_agent_context_schema() {
        let payload = agent_context_payload("invoice_matcher", "invoice_match_decision", 0.92, "txn-1");
        let collection = agent_memory::Collection::well_known("agent_context").expect("declared");
        assert!(collection.validate(&payload).is_ok());
    }
}
