//! End-to-end coverage of spec scenarios S1-S4 against the compiled
//! invoice-matcher and feed-publisher graphs, using a hand-rolled fake
//! [`GraphCapabilities`] so these tests exercise real graph execution
//! without a live embedding provider or vector store.

use std::sync::Arc;

use agent_graph::capabilities::{CapabilityError, GraphCapabilities, LlmCompletion, LlmOptions};
use agent_graph::feed_publisher::{self, FeedPublisherState, PublishDecision, SocialPostRequest};
use agent_graph::invoice_matcher::{self, CandidateInvoice, DecisionType, InvoiceMatcherState, Transaction};
use agent_graph::GraphState;
use agent_memory::{FilterExpr, Payload, Scalar, ScoredDocument};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

/// A fake [`GraphCapabilities`] whose `memory_search` returns a fixed set of
/// hits and whose `memory_save` records every call for inspection.
struct FakeCapabilities {
    search_hits: Vec<ScoredDocument>,
    caption: String,
    saved: Mutex<Vec<(String, String, Payload)>>,
}

impl FakeCapabilities {
    fn with_hits(hits: Vec<ScoredDocument>) -> Self {
        Self { search_hits: hits, caption: "Shop now and discover our new summer collection online today! 🎉🛍️".to_string(), saved: Mutex::new(Vec::new()) }
    }

    fn with_hits_and_caption(hits: Vec<ScoredDocument>, caption: impl Into<String>) -> Self {
        Self { search_hits: hits, caption: caption.into(), saved: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl GraphCapabilities for FakeCapabilities {
    async fn memory_search(
        &self,
        _collection: &str,
        _query: &str,
        _top_k: usize,
        _filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredDocument>, CapabilityError> {
        Ok(self.search_hits.clone())
    }

    async fn memory_save(
        &self,
        collection: &str,
        content: &str,
        metadata: Payload,
    ) -> Result<u64, CapabilityError> {
        let mut saved = self.saved.lock();
        saved.push((collection.to_string(), content.to_string(), metadata));
        Ok(saved.len() as u64)
    }

    async fn llm_complete(
        &self,
        _prompt: &str,
        _options: LlmOptions,
    ) -> Result<LlmCompletion, CapabilityError> {
        Ok(LlmCompletion { text: self.caption.clone(), model: "fake".to_string() })
    }

    async fn describe_image(&self, _image_url: &str) -> Result<String, CapabilityError> {
        Ok("a product photo".to_string())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn social_request(brand: &str, platform: &str) -> SocialPostRequest {
    SocialPostRequest {
        brand: brand.to_string(),
        platform: platform.to_string(),
        image_url: None,
        target_language: "English".to_string(),
        target_language_keywords: vec!["the".to_string(), "and".to_string()],
    }
}

/// S1: a transaction whose vendor, amount, and date match a candidate
/// invoice exactly auto-matches and is recorded via `save_context`.
#[tokio::test]
async fn s1_exact_match_auto_matches_and_saves() {
    let graph = invoice_matcher::build().expect("graph compiles");
    let caps: Arc<dyn GraphCapabilities> = Arc::new(FakeCapabilities::with_hits(Vec::new()));

    let transaction = Transaction {
        transaction_id: "txn-100".to_string(),
        vendor_name: "SNCB".to_string(),
        amount: 22.70,
        date: date(2025, 1, 3),
    };
    let invoice =
        CandidateInvoice { invoice_id: 1, vendor_name: "SNCB".to_string(), amount: 22.70, date: date(2025, 1, 3) };
    let state = InvoiceMatcherState::new(transaction, vec![invoice]);
    let result = graph.invoke(state, caps).await.expect("invoke succeeds");

    assert!(result.matched);
    assert_eq!(result.invoice_id, Some(1));
    assert_eq!(result.decision_type, DecisionType::AutoMatch);
    assert!(result.confidence >= 0.95, "{}", result.confidence);
    assert_eq!(
        result.steps_completed(),
        &["build_query", "search_memory", "compare_invoices", "save_context"]
    );
}

/// S2: a fuzzy vendor-name match lands in the human-review band rather than
/// being auto-matched or discarded.
#[tokio::test]
async fn s2_fuzzy_vendor_routes_to_human_review() {
    let graph = invoice_matcher::build().expect("graph compiles");
    let caps: Arc<dyn GraphCapabilities> = Arc::new(FakeCapabilities::with_hits(Vec::new()));

    let transaction = Transaction {
        transaction_id: "txn-200".to_string(),
        vendor_name: "NMBS".to_string(),
        amount: 22.50,
        date: date(2025, 1, 3),
    };
    let invoice = CandidateInvoice {
        invoice_id: 2,
        vendor_name: "SNCB/NMBS".to_string(),
        amount: 22.70,
        date: date(2025, 1, 3),
    };
    let state = InvoiceMatcherState::new(transaction, vec![invoice]);
    let result = graph.invoke(state, caps).await.expect("invoke succeeds");

    assert!(result.matched);
    assert_eq!(result.invoice_id, Some(2));
    assert_eq!(result.decision_type, DecisionType::HumanReview);
    assert!(
        (0.70..0.90).contains(&result.confidence),
        "confidence {} out of band",
        result.confidence
    );
    assert!(result.warnings().iter().any(|w| w.contains("human review")));
}

/// S3: an unrelated candidate resolves to `no_match` without erroring, and
/// `save_context` never runs.
#[tokio::test]
async fn s3_unrelated_candidate_is_no_match() {
    let graph = invoice_matcher::build().expect("graph compiles");
    let caps: Arc<dyn GraphCapabilities> = Arc::new(FakeCapabilities::with_hits(Vec::new()));

    let transaction = Transaction {
        transaction_id: "txn-300".to_string(),
        vendor_name: "Unknown".to_string(),
        amount: 100.00,
        date: date(2025, 1, 3),
    };
    let invoice =
        CandidateInvoice { invoice_id: 3, vendor_name: "SNCB".to_string(), amount: 22.70, date: date(2025, 1, 3) };
    let state = InvoiceMatcherState::new(transaction, vec![invoice]);
    let result = graph.invoke(state, caps).await.expect("invoke succeeds");

    assert!(!result.matched);
    assert!(result.confidence < 0.70, "{}", result.confidence);
    assert_eq!(result.decision_type, DecisionType::NoMatch);
    assert!(!result.steps_completed().contains(&"save_context".to_string()));
}

/// S4: a duplicate caption is detected and the draft is saved without being
/// published, but `save_memory` still runs (spec: duplicates are recorded,
/// not dropped).
#[tokio::test]
async fn s4_duplicate_caption_saved_without_publishing() {
    let graph = feed_publisher::build().expect("graph compiles");
    let mut payload = Payload::new();
    payload.insert("brand".to_string(), Scalar::Str("Acme".to_string()));
    payload.insert("platform".to_string(), Scalar::Str("instagram".to_string()));
    payload.insert("caption".to_string(), Scalar::Str("Shop our summer collection now!".to_string()));
    let duplicate_hit = ScoredDocument { id: 7, score: 0.99, payload };
    let caps: Arc<dyn GraphCapabilities> = Arc::new(FakeCapabilities::with_hits(vec![duplicate_hit]));

    let request = social_request("Acme", "instagram");
    let state = FeedPublisherState::new(request);
    let result = graph.invoke(state, caps).await.expect("invoke succeeds");

    assert!(result.duplicate_detected);
    assert_eq!(result.similar_caption.as_deref(), Some("Shop our summer collection now!"));
    assert_eq!(result.decision, Some(PublishDecision::SaveOnly));
    assert!(!result.published);
    assert!(result.saved_document_id.is_some(), "duplicate must still be saved");
    assert_eq!(
        result.steps_completed(),
        &["check_history", "describe_image", "generate_caption", "quality_check", "save_only", "save_memory"]
    );
}

/// A non-duplicate post whose generated caption scores highly publishes
/// and saves.
#[tokio::test]
async fn non_duplicate_high_quality_post_publishes() {
    let graph = feed_publisher::build().expect("graph compiles");
    let caps: Arc<dyn GraphCapabilities> = Arc::new(FakeCapabilities::with_hits_and_caption(
        Vec::new(),
        "Acme is back — shop now and discover the new collection, today only! #acme 🎉🛍️",
    ));

    let mut request = social_request("Acme", "instagram");
    request.target_language_keywords = vec!["the".to_string(), "and".to_string()];
    let state = FeedPublisherState::new(request);
    let result = graph.invoke(state, caps).await.expect("invoke succeeds");

    assert_eq!(result.decision, Some(PublishDecision::Publish));
    assert!(result.published);
    assert!(result.saved_document_id.is_some());
    assert!(result.quality >= feed_publisher::PUBLISH_QUALITY_THRESHOLD, "{}", result.quality);
}

/// A post that clears the language and brand checks but has no emoji,
/// hashtag, or call-to-action lands in the middle band: saved, but not
/// published without a human reviewer.
#[tokio::test]
async fn medium_quality_post_needs_approval() {
    let graph = feed_publisher::build().expect("graph compiles");
    let caps: Arc<dyn GraphCapabilities> = Arc::new(FakeCapabilities::with_hits_and_caption(
        Vec::new(),
        "Acme and the whole team just unveiled something new for the community this week.",
    ));

    let request = social_request("Acme", "instagram");
    let state = FeedPublisherState::new(request);
    let result = graph.invoke(state, caps).await.expect("invoke succeeds");

    assert!(!result.duplicate_detected);
    assert_eq!(result.decision, Some(PublishDecision::NeedsApproval));
    assert!(result.requires_human_approval);
    assert!(result.saved_document_id.is_some());
    assert!(!result.published);
    assert!((0.70..0.85).contains(&result.quality), "{}", result.quality);
}
