//! Benchmarks for [`agent_eval::percentile`] and [`agent_eval::aggregate`]
//! over result batches of increasing size.
//!
//! Run with: cargo bench --package agent-eval

use std::collections::BTreeMap;
use std::time::Duration;

use agent_eval::{aggregate, percentile, CaseResult, Difficulty, PriceTable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn fixture_results(count: usize) -> Vec<CaseResult<(), ()>> {
    (0..count)
        .map(|i| CaseResult {
            case_id: i.to_string(),
            difficulty: if i % 3 == 0 { Difficulty::Hard } else { Difficulty::Easy },
            correct: i % 4 != 0,
            actual: Some(()),
            expected: (),
            latency: Duration::from_micros((i % 500) as u64 + 1),
            error: None,
            metrics: BTreeMap::new(),
            prediction: None,
            cost: None,
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let prices = PriceTable::default();
    let mut group = c.benchmark_group("aggregate");
    for size in &[100, 1_000, 10_000] {
        let results = fixture_results(*size);
        group.bench_with_input(BenchmarkId::new("aggregate", size), &results, |b, results| {
            b.iter(|| black_box(aggregate(black_box(results), &prices)));
        });
    }
    group.finish();
}

fn bench_percentile(c: &mut Criterion) {
    let durations: Vec<Duration> = (0..10_000).map(Duration::from_micros).collect();
    c.bench_function("percentile_p95_10k", |b| {
        b.iter(|| black_box(percentile(black_box(&durations), 0.95)));
    });
}

criterion_group!(benches, bench_aggregate, bench_percentile);
criterion_main!(benches);
