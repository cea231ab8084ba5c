//! `agent-cli eval`: runs a dataset file through one of the two reasoning
//! graphs and reports aggregate accuracy/latency metrics (C6).

use std::fs;
use std::path::Path;
use std::sync::Arc;

use agent_eval::{aggregate, evaluate, CostTrackingCapabilities, CostTracker, Dataset, PriceTable};
use agent_eval::subjects::{
    caption_quality_correctness, invoice_matcher_correctness, ExpectedCaptionQuality, ExpectedInvoiceOutcome,
    FeedPublisherSubject, InvoiceMatcherInput, InvoiceMatcherSubject,
};
use agent_graph::{GraphCapabilities, MemoryGraphCapabilities};
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::context::RuntimeContext;
use crate::llm::NullLlmClient;
use crate::output::{print_output, Output, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EvalSubject {
    InvoiceMatcher,
    FeedPublisher,
}

#[derive(Debug, Serialize)]
struct EvalReport {
    dataset_name: String,
    total_cases: usize,
    accuracy: f64,
    per_difficulty_accuracy: Vec<(String, f64)>,
    p50_latency_ms: u128,
    p95_latency_ms: u128,
    false_positive_rate: Option<f64>,
    false_negative_rate: Option<f64>,
    extra: Vec<(String, f64)>,
    total_cost_usd: f64,
}

impl Output for EvalReport {
    fn write_human(&self) -> String {
        let mut lines = vec![
            format!("dataset: {} ({} case(s))", self.dataset_name, self.total_cases),
            format!("accuracy: {:.2}%", self.accuracy * 100.0),
            format!("p50 latency: {}ms, p95 latency: {}ms", self.p50_latency_ms, self.p95_latency_ms),
        ];
        for (difficulty, acc) in &self.per_difficulty_accuracy {
            lines.push(format!("  {difficulty}: {:.2}%", acc * 100.0));
        }
        if let Some(fp) = self.false_positive_rate {
            lines.push(format!("false positive rate: {:.2}%", fp * 100.0));
        }
        if let Some(fn_) = self.false_negative_rate {
            lines.push(format!("false negative rate: {:.2}%", fn_ * 100.0));
        }
        for (key, value) in &self.extra {
            lines.push(format!("{key}: {value:.4}"));
        }
        lines.push(format!("total cost: ${:.4}", self.total_cost_usd));
        lines.join("\n")
    }
}

pub async fn handle_run_command(
    ctx: &RuntimeContext,
    subject: EvalSubject,
    dataset_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let raw = fs::read_to_string(dataset_path)?;
    // Shared with `evaluate` below so per-case cost is attributed, not just
    // the aggregate total.
    let cost_tracker = Arc::new(CostTracker::new());
    let capabilities: Arc<dyn GraphCapabilities> = Arc::new(CostTrackingCapabilities::new(
        Arc::new(MemoryGraphCapabilities::new(ctx.memory.clone(), Arc::new(NullLlmClient))),
        Arc::clone(&cost_tracker),
    ));
    let prices = PriceTable::default();

    let report = match subject {
        EvalSubject::InvoiceMatcher => {
            let dataset: Dataset<InvoiceMatcherInput, ExpectedInvoiceOutcome> = Dataset::from_json(&raw)?;
            let subject = InvoiceMatcherSubject::new(capabilities)?;
            let results = evaluate(&subject, &dataset, &invoice_matcher_correctness, Some(cost_tracker.as_ref())).await;
            build_report(&dataset.dataset_name, &aggregate(&results, &prices))
        }
        EvalSubject::FeedPublisher => {
            let dataset: Dataset<agent_graph::feed_publisher::SocialPostRequest, ExpectedCaptionQuality> =
                Dataset::from_json(&raw)?;
            let subject = FeedPublisherSubject::new(capabilities)?;
            let results = evaluate(&subject, &dataset, &caption_quality_correctness, Some(cost_tracker.as_ref())).await;
            build_report(&dataset.dataset_name, &aggregate(&results, &prices))
        }
    };

    if report.total_cases == 0 {
        bail!("dataset {} has no test cases", dataset_path.display());
    }
    print_output(&report, format)
}

fn build_report(dataset_name: &str, metrics: &agent_eval::AggregateMetrics) -> EvalReport {
    EvalReport {
        dataset_name: dataset_name.to_string(),
        total_cases: metrics.total_cases,
        accuracy: metrics.accuracy,
        per_difficulty_accuracy: metrics
            .per_difficulty_accuracy
            .iter()
            .map(|(d, acc)| (format!("{d:?}").to_lowercase(), *acc))
            .collect(),
        p50_latency_ms: metrics.p50_latency.as_millis(),
        p95_latency_ms: metrics.p95_latency.as_millis(),
        false_positive_rate: metrics.false_positive_rate,
        false_negative_rate: metrics.false_negative_rate,
        extra: metrics.extra.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        total_cost_usd: metrics.total_cost_usd,
    }
}
