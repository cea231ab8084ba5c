//! Domain adapters wiring the two concrete reasoning graphs
//! into [`crate::evaluator::Subject`], and the correctness definitions spec
//! §4.6 names for each.

use std::collections::BTreeMap;
use std::sync::Arc;

use agent_graph::capabilities::GraphCapabilities;
use agent_graph::invoice_matcher::{self, CandidateInvoice, DecisionType, InvoiceMatcherState, Transaction};
use agent_graph::feed_publisher::{self, FeedPublisherState, SocialPostRequest};
use agent_graph::GraphError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::evaluator::Subject;
use crate::result::Prediction;

/// One invoice-matcher evaluation input: the transaction plus the
/// invoices supplied alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceMatcherInput {
    pub transaction: Transaction,
    pub candidates: Vec<CandidateInvoice>,
}

/// Expected outcome for one invoice-matcher dataset case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedInvoiceOutcome {
    pub matched: bool,
    pub invoice_id: Option<u64>,
    pub decision_type: DecisionType,
}

/// Runs the compiled invoice-matcher graph as a [`Subject`].
pub struct InvoiceMatcherSubject {
    graph: agent_graph::CompiledGraph<InvoiceMatcherState>,
    capabilities: Arc<dyn GraphCapabilities>,
}

impl InvoiceMatcherSubject {
    /// # Errors
    /// Returns [`GraphError`] if the invoice-matcher graph fails to compile.
    pub fn new(capabilities: Arc<dyn GraphCapabilities>) -> Result<Self, GraphError> {
        Ok(Self { graph: invoice_matcher::build()?, capabilities })
    }
}

#[async_trait]
impl Subject for InvoiceMatcherSubject {
    type Input = InvoiceMatcherInput;
    type Output = InvoiceMatcherState;
    type Error = GraphError;

    async fn run(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let state = InvoiceMatcherState::new(input.transaction, input.candidates);
        self.graph.invoke(state, Arc::clone(&self.capabilities)).await
    }
}

/// Correctness per spec §4.6: "Correct iff `expected.matched ==
/// actual.matched` AND (if matched) `expected.invoice_id ==
/// actual.invoice_id`." Reports `decision_accuracy` as an extra metric and
/// a [`Prediction`] against `expected.matched` for false-positive/negative
/// rollup.
#[must_use]
pub fn invoice_matcher_correctness(
    expected: &ExpectedInvoiceOutcome,
    actual: &InvoiceMatcherState,
) -> (bool, Option<Prediction>, BTreeMap<String, f64>) {
    let matched_correct = expected.matched == actual.matched;
    let id_correct = !actual.matched || expected.invoice_id == actual.invoice_id;
    let correct = matched_correct && id_correct;

    let prediction = Some(match (expected.matched, actual.matched) {
        (true, true) => Prediction::TruePositive,
        (false, false) => Prediction::TrueNegative,
        (false, true) => Prediction::FalsePositive,
        (true, false) => Prediction::FalseNegative,
    });

    let mut metrics = BTreeMap::new();
    let decision_accuracy = f64::from(u8::from(expected.decision_type == actual.decision_type));
    metrics.insert("decision_accuracy".to_string(), decision_accuracy);

    (correct, prediction, metrics)
}

/// Expected outcome for one feed-publisher dataset case: the caption
/// quality score spec §4.6 defines correctness against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedCaptionQuality {
    pub quality: f64,
}

/// Correctness tolerance for caption quality scoring.
pub const QUALITY_TOLERANCE: f64 = 0.15;

/// Runs the compiled feed-publisher graph as a [`Subject`].
pub struct FeedPublisherSubject {
    graph: agent_graph::CompiledGraph<FeedPublisherState>,
    capabilities: Arc<dyn GraphCapabilities>,
}

impl FeedPublisherSubject {
    /// # Errors
    /// Returns [`GraphError`] if the feed-publisher graph fails to compile.
    pub fn new(capabilities: Arc<dyn GraphCapabilities>) -> Result<Self, GraphError> {
        Ok(Self { graph: feed_publisher::build()?, capabilities })
    }
}

#[async_trait]
impl Subject for FeedPublisherSubject {
    type Input = SocialPostRequest;
    type Output = FeedPublisherState;
    type Error = GraphError;

    async fn run(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let state = FeedPublisherState::new(input);
        self.graph.invoke(state, Arc::clone(&self.capabilities)).await
    }
}

/// Correctness per spec §4.6: "Score correctness: `|expected.quality -
/// actual.quality| <= 0.15`."
#[must_use]
pub fn caption_quality_correctness(
    expected: &ExpectedCaptionQuality,
    actual: &FeedPublisherState,
) -> (bool, Option<Prediction>, BTreeMap<String, f64>) {
    let error = (expected.quality - actual.quality).abs();
    let correct = error <= QUALITY_TOLERANCE;
    let mut metrics = BTreeMap::new();
    metrics.insert("quality_error".to_string(), error);
    (correct, None, metrics)
}
