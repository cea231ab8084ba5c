//! Execution cost tracking: token counts times a declared price table (spec
//! §4.6). Grounded in the teacher's `reward::domain_stats`-style aggregation
//! (per-case figures rolled into a total), generalized from reward scoring
//! to dollar cost.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unit prices, in USD per 1000 tokens, for each token category a case may
/// consume.
#[derive(Debug, Clone, Copy)]
pub struct PriceTable {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
    pub embedding_per_1k: f64,
}

impl Default for PriceTable {
    /// A representative OpenAI-style small-model price point; callers
    /// running against a real provider should supply the provider's actual
    /// published prices.
    fn default() -> Self {
        Self { prompt_per_1k: 0.00015, completion_per_1k: 0.0006, embedding_per_1k: 0.00002 }
    }
}

/// Token usage recorded for one evaluated case.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseCost {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub embedding_tokens: u64,
}

impl CaseCost {
    #[must_use]
    pub fn dollars(&self, prices: &PriceTable) -> f64 {
        (self.prompt_tokens as f64 / 1000.0) * prices.prompt_per_1k
            + (self.completion_tokens as f64 / 1000.0) * prices.completion_per_1k
            + (self.embedding_tokens as f64 / 1000.0) * prices.embedding_per_1k
    }

    /// Per-field saturating difference, used to recover one case's token
    /// usage from a tracker's before/after totals.
    #[must_use]
    pub fn saturating_sub(&self, earlier: CaseCost) -> CaseCost {
        CaseCost {
            prompt_tokens: self.prompt_tokens.saturating_sub(earlier.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_sub(earlier.completion_tokens),
            embedding_tokens: self.embedding_tokens.saturating_sub(earlier.embedding_tokens),
        }
    }
}

/// Accumulates token usage across an evaluation run and reports per-case
/// and total cost against a [`PriceTable`].
#[derive(Default)]
pub struct CostTracker {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    embedding_tokens: AtomicU64,
}

impl CostTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, cost: CaseCost) {
        self.prompt_tokens.fetch_add(cost.prompt_tokens, Ordering::Relaxed);
        self.completion_tokens.fetch_add(cost.completion_tokens, Ordering::Relaxed);
        self.embedding_tokens.fetch_add(cost.embedding_tokens, Ordering::Relaxed);
    }

    #[must_use]
    pub fn totals(&self) -> CaseCost {
        CaseCost {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            embedding_tokens: self.embedding_tokens.load(Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn total_cost(&self, prices: &PriceTable) -> f64 {
        self.totals().dollars(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_records() {
        let tracker = CostTracker::new();
        tracker.record(CaseCost { prompt_tokens: 1000, completion_tokens: 500, embedding_tokens: 200 });
        tracker.record(CaseCost { prompt_tokens: 1000, completion_tokens: 0, embedding_tokens: 0 });
        let totals = tracker.totals();
        assert_eq!(totals.prompt_tokens, 2000);
        assert_eq!(totals.completion_tokens, 500);
        assert_eq!(totals.embedding_tokens, 200);
    }

    #[test]
    fn dollars_match_hand_computed_price() {
        let prices = PriceTable { prompt_per_1k: 1.0, completion_per_1k: 2.0, embedding_per_1k: 0.5 };
        let cost = CaseCost { prompt_tokens: 1000, completion_tokens: 1000, embedding_tokens: 2000 };
        assert!((cost.dollars(&prices) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn saturating_sub_recovers_one_cases_delta() {
        let before = CaseCost { prompt_tokens: 1000, completion_tokens: 200, embedding_tokens: 50 };
        let after = CaseCost { prompt_tokens: 1400, completion_tokens: 260, embedding_tokens: 50 };
        let delta = after.saturating_sub(before);
        assert_eq!(delta.prompt_tokens, 400);
        assert_eq!(delta.completion_tokens, 60);
        assert_eq!(delta.embedding_tokens, 0);
    }
}
