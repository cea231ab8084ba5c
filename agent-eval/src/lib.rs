//! `agent-eval`: C6, the evaluation harness. Drives a [`Subject`] (a graph,
//! a workflow-wrapped graph, or any async `run(input) -> output`) against a
//! [`Dataset`] of `{input, expected}` cases and computes aggregate
//! metrics.

pub mod aggregate;
pub mod cost;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod result;
pub mod subjects;
pub mod tracking;

pub use aggregate::{aggregate, percentile, AggregateMetrics};
pub use cost::{CaseCost, CostTracker, PriceTable};
pub use dataset::{Dataset, Difficulty, TestCase};
pub use error::{EvalError, Result};
pub use evaluator::{evaluate, Correctness, Subject};
pub use result::{CaseResult, Prediction};
pub use tracking::CostTrackingCapabilities;
