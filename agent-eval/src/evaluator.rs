//! [`Subject`] and `evaluate`: the harness's only entry points.
//!
//! `Subject` is deliberately narrow — "anything exposing an `async fn
//! run(&self, input) -> Output`" — so both a bare compiled graph and a workflow-wrapped graph
//! can be evaluated without harness changes; `agent-workflow`'s
//! `WorkflowExecutor` satisfies the same shape as the `subjects` module's
//! graph adapters.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;

use crate::cost::CostTracker;
use crate::dataset::Dataset;
use crate::result::{CaseResult, Prediction};

/// Anything `evaluate` can drive: a graph, a workflow-wrapped graph, or a
/// hand-rolled stub in tests.
#[async_trait]
pub trait Subject: Send + Sync {
    type Input: Send;
    type Output: Send;
    type Error: std::fmt::Display + Send + Sync + 'static;

    async fn run(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}

/// Decides, for one case, whether `actual` matches `expected`: `correct`,
/// an optional [`Prediction`] for false-positive/false-negative rollup, and
/// any per-case metrics to fold into `aggregate`'s `extra` map.
pub trait Correctness<Output, Expected> {
    fn judge(&self, expected: &Expected, actual: &Output) -> (bool, Option<Prediction>, BTreeMap<String, f64>);
}

impl<F, Output, Expected> Correctness<Output, Expected> for F
where
    F: Fn(&Expected, &Output) -> (bool, Option<Prediction>, BTreeMap<String, f64>),
{
    fn judge(&self, expected: &Expected, actual: &Output) -> (bool, Option<Prediction>, BTreeMap<String, f64>) {
        self(expected, actual)
    }
}

/// Drives `subject` through every case in `dataset`, judging each with
/// `correctness` (spec §4.6: `evaluate(subject, dataset) -> sequence of
/// CaseResult`). When `cost_tracker` is `Some`, each case's token usage is
/// recovered from the tracker's before/after totals and attached as
/// `CaseResult::cost` — the tracker itself is expected to be shared with
/// whatever `GraphCapabilities` decorator `subject` calls into (e.g.
/// `CostTrackingCapabilities`), since `Subject`/`Correctness` carry no token
/// counts of their own.
pub async fn evaluate<S, Expected, C>(
    subject: &S,
    dataset: &Dataset<S::Input, Expected>,
    correctness: &C,
    cost_tracker: Option<&CostTracker>,
) -> Vec<CaseResult<S::Output, Expected>>
where
    S: Subject,
    S::Input: Clone,
    Expected: Clone,
    C: Correctness<S::Output, Expected>,
{
    let mut results = Vec::with_capacity(dataset.test_cases.len());
    for case in &dataset.test_cases {
        let before = cost_tracker.map(CostTracker::totals);
        let start = Instant::now();
        let outcome = subject.run(case.input.clone()).await;
        let latency = start.elapsed();
        let cost = match (cost_tracker, before) {
            (Some(tracker), Some(before)) => Some(tracker.totals().saturating_sub(before)),
            _ => None,
        };

        let (correct, actual, error, prediction, metrics) = match outcome {
            Ok(output) => {
                let (correct, prediction, metrics) = correctness.judge(&case.expected, &output);
                (correct, Some(output), None, prediction, metrics)
            }
            Err(e) => (false, None, Some(e.to_string()), None, BTreeMap::new()),
        };

        results.push(CaseResult {
            case_id: case.id.clone(),
            difficulty: case.difficulty,
            correct,
            actual,
            expected: case.expected.clone(),
            latency,
            error,
            metrics,
            prediction,
            cost,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Difficulty, TestCase};

    struct EchoSubject;

    #[async_trait]
    impl Subject for EchoSubject {
        type Input = i64;
        type Output = i64;
        type Error = std::convert::Infallible;

        async fn run(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
            Ok(input)
        }
    }

    fn exact_match(expected: &i64, actual: &i64) -> (bool, Option<Prediction>, BTreeMap<String, f64>) {
        (expected == actual, None, BTreeMap::new())
    }

    #[tokio::test]
    async fn evaluate_runs_every_case_and_judges_correctness() {
        let dataset = Dataset {
            dataset_name: "echo".to_string(),
            version: "1".to_string(),
            test_cases: vec![
                TestCase { id: "a".to_string(), difficulty: Difficulty::Easy, input: 1, expected: 1 },
                TestCase { id: "b".to_string(), difficulty: Difficulty::Easy, input: 2, expected: 3 },
            ],
        };
        let results = evaluate(&EchoSubject, &dataset, &exact_match, None).await;
        assert!(results[0].correct);
        assert!(!results[1].correct);
        assert!(results[0].cost.is_none(), "no tracker was supplied");
    }

    #[tokio::test]
    async fn evaluate_attributes_tracked_cost_to_the_case_that_incurred_it() {
        let dataset = Dataset {
            dataset_name: "echo".to_string(),
            version: "1".to_string(),
            test_cases: vec![TestCase { id: "a".to_string(), difficulty: Difficulty::Easy, input: 1, expected: 1 }],
        };
        let tracker = crate::cost::CostTracker::new();
        tracker.record(crate::cost::CaseCost { prompt_tokens: 42, completion_tokens: 7, embedding_tokens: 0 });
        let results = evaluate(&EchoSubject, &dataset, &exact_match, Some(&tracker)).await;
        let cost = results[0].cost.expect("tracker was supplied");
        assert_eq!(cost.prompt_tokens, 42);
        assert_eq!(cost.completion_tokens, 7);
    }
}
