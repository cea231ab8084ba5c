//! [`CaseResult`]: the per-case outcome `evaluate` produces.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::cost::CaseCost;
use crate::dataset::Difficulty;

/// Whether a case counts as a positive/negative prediction, for the
/// false-positive/false-negative rates `aggregate` reports "where
/// applicable". Domain-specific correctness functions decide
/// what "positive" means (e.g. invoice matcher: `matched == true`); leave
/// `None` for cases with no natural positive/negative framing (e.g. caption
/// quality score correctness).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

/// The outcome of running one dataset case through a [`crate::evaluator::Subject`].
#[derive(Debug, Clone)]
pub struct CaseResult<Actual, Expected> {
    pub case_id: String,
    pub difficulty: Difficulty,
    pub correct: bool,
    pub actual: Option<Actual>,
    pub expected: Expected,
    pub latency: Duration,
    pub error: Option<String>,
    pub metrics: BTreeMap<String, f64>,
    pub prediction: Option<Prediction>,
    /// Token usage attributed to this case, when `evaluate` was run with a
    /// [`crate::cost::CostTracker`] (spec §4.6); `None` otherwise.
    pub cost: Option<CaseCost>,
}
