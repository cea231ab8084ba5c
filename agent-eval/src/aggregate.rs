//! `aggregate(results) -> Map<string, f64>`: overall accuracy,
//! per-difficulty accuracy, p50/p95 latency, false-positive/false-negative
//! rates.
//!
//! Percentiles are computed with the same nearest-rank method `criterion`
//! uses for its own latency summaries, so results read consistently with
//! whatever `cargo bench` output the team already looks at (this workspace
//! depends on `criterion` for benches; see `benches/latency_percentiles.rs`).

use std::collections::BTreeMap;
use std::time::Duration;

use crate::cost::PriceTable;
use crate::dataset::Difficulty;
use crate::result::{CaseResult, Prediction};

/// Aggregate statistics over a batch of [`CaseResult`]s.
#[derive(Debug, Clone)]
pub struct AggregateMetrics {
    pub total_cases: usize,
    pub accuracy: f64,
    pub per_difficulty_accuracy: BTreeMap<Difficulty, f64>,
    pub p50_latency: Duration,
    pub p95_latency: Duration,
    pub false_positive_rate: Option<f64>,
    pub false_negative_rate: Option<f64>,
    /// Domain-specific metrics, averaged across cases that reported them
    /// (e.g. `decision_accuracy`, `quality_error`).
    pub extra: BTreeMap<String, f64>,
    /// Total dollar cost across every case that reported a [`crate::cost::CaseCost`]
    /// (spec §4.6), priced against `prices`. Zero if no case carried cost
    /// data.
    pub total_cost_usd: f64,
}

/// Nearest-rank percentile over a slice of durations; `p` in `[0.0, 1.0]`.
/// Empty input yields `Duration::ZERO`.
#[must_use]
pub fn percentile(durations: &[Duration], p: f64) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }
    let mut sorted: Vec<Duration> = durations.to_vec();
    sorted.sort();
    let rank = ((p * sorted.len() as f64).ceil() as usize).clamp(1, sorted.len());
    sorted[rank - 1]
}

/// Computes aggregate metrics over `results`, pricing any per-case
/// [`crate::cost::CaseCost`] against `prices`.
///
/// Testable property ("evaluator monotonicity", spec §8): appending a
/// failing case to `results` cannot raise the returned `accuracy`.
#[must_use]
pub fn aggregate<Actual, Expected>(
    results: &[CaseResult<Actual, Expected>],
    prices: &PriceTable,
) -> AggregateMetrics {
    let total_cases = results.len();
    let correct_count = results.iter().filter(|r| r.correct).count();
    let accuracy = if total_cases == 0 { 0.0 } else { correct_count as f64 / total_cases as f64 };

    let mut per_difficulty_accuracy = BTreeMap::new();
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let in_band: Vec<_> = results.iter().filter(|r| r.difficulty == difficulty).collect();
        if in_band.is_empty() {
            continue;
        }
        let band_correct = in_band.iter().filter(|r| r.correct).count();
        per_difficulty_accuracy.insert(difficulty, band_correct as f64 / in_band.len() as f64);
    }

    let latencies: Vec<Duration> = results.iter().map(|r| r.latency).collect();
    let p50_latency = percentile(&latencies, 0.50);
    let p95_latency = percentile(&latencies, 0.95);

    let predictions: Vec<Prediction> = results.iter().filter_map(|r| r.prediction).collect();
    let (false_positive_rate, false_negative_rate) = if predictions.is_empty() {
        (None, None)
    } else {
        let fp = predictions.iter().filter(|p| matches!(p, Prediction::FalsePositive)).count();
        let fn_ = predictions.iter().filter(|p| matches!(p, Prediction::FalseNegative)).count();
        (Some(fp as f64 / predictions.len() as f64), Some(fn_ as f64 / predictions.len() as f64))
    };

    let mut extra_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for result in results {
        for (key, value) in &result.metrics {
            let entry = extra_sums.entry(key.clone()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }
    let extra = extra_sums.into_iter().map(|(k, (sum, count))| (k, sum / count as f64)).collect();

    let total_cost_usd = results.iter().filter_map(|r| r.cost).map(|c| c.dollars(prices)).sum();

    AggregateMetrics {
        total_cases,
        accuracy,
        per_difficulty_accuracy,
        p50_latency,
        p95_latency,
        false_positive_rate,
        false_negative_rate,
        extra,
        total_cost_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(correct: bool, difficulty: Difficulty, latency_ms: u64) -> CaseResult<(), ()> {
        CaseResult {
            case_id: "c".to_string(),
            difficulty,
            correct,
            actual: Some(()),
            expected: (),
            latency: Duration::from_millis(latency_ms),
            error: None,
            metrics: BTreeMap::new(),
            prediction: None,
            cost: None,
        }
    }

    #[test]
    fn accuracy_over_empty_results_is_zero() {
        let metrics = aggregate::<(), ()>(&[], &PriceTable::default());
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.total_cases, 0);
        assert_eq!(metrics.total_cost_usd, 0.0);
    }

    #[test]
    fn per_difficulty_accuracy_is_isolated_per_band() {
        let results = vec![
            case(true, Difficulty::Easy, 10),
            case(false, Difficulty::Easy, 10),
            case(true, Difficulty::Hard, 10),
        ];
        let metrics = aggregate(&results, &PriceTable::default());
        assert!((metrics.per_difficulty_accuracy[&Difficulty::Easy] - 0.5).abs() < f64::EPSILON);
        assert!((metrics.per_difficulty_accuracy[&Difficulty::Hard] - 1.0).abs() < f64::EPSILON);
        assert!(!metrics.per_difficulty_accuracy.contains_key(&Difficulty::Medium));
    }

    #[test]
    fn total_cost_sums_only_cases_that_report_it() {
        let mut priced = case(true, Difficulty::Easy, 10);
        priced.cost = Some(crate::cost::CaseCost { prompt_tokens: 1000, completion_tokens: 0, embedding_tokens: 0 });
        let unpriced = case(true, Difficulty::Easy, 10);
        let prices = PriceTable { prompt_per_1k: 2.0, completion_per_1k: 0.0, embedding_per_1k: 0.0 };
        let metrics = aggregate(&[priced, unpriced], &prices);
        assert!((metrics.total_cost_usd - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentile_picks_nearest_rank() {
        let durations: Vec<Duration> = (1..=100).map(Duration::from_millis).collect();
        assert_eq!(percentile(&durations, 0.50), Duration::from_millis(50));
        assert_eq!(percentile(&durations, 0.95), Duration::from_millis(95));
    }

    proptest::proptest! {
        #[test]
        fn appending_a_failing_case_never_increases_accuracy(
            initial_correct in proptest::collection::vec(proptest::bool::ANY, 0..30),
        ) {
            let before: Vec<_> = initial_correct
                .iter()
                .map(|&correct| case(correct, Difficulty::Easy, 1))
                .collect();
            let accuracy_before = aggregate(&before, &PriceTable::default()).accuracy;

            let mut after = before;
            after.push(case(false, Difficulty::Easy, 1));
            let accuracy_after = aggregate(&after, &PriceTable::default()).accuracy;

            proptest::prop_assert!(accuracy_after <= accuracy_before + f64::EPSILON);
        }
    }
}
