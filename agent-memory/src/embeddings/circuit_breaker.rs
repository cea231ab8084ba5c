//! A consecutive-failure circuit breaker guarding network-backed embedding
//! providers.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

/// Opens after `failure_threshold` consecutive failures; half-opens after
/// `cooldown` to allow one trial call through.
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown_ms: u64,
    consecutive_failures: AtomicU32,
    opened_at_ms: AtomicU64,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(failure_threshold: u32, cooldown: std::time::Duration) -> Self {
        Self {
            failure_threshold,
            cooldown_ms: cooldown.as_millis() as u64,
            consecutive_failures: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
        }
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn state(&self) -> State {
        let failures = self.consecutive_failures.load(Ordering::Acquire);
        if failures < self.failure_threshold {
            return State::Closed;
        }
        let opened_at = self.opened_at_ms.load(Ordering::Acquire);
        if Self::now_ms().saturating_sub(opened_at) >= self.cooldown_ms {
            State::HalfOpen
        } else {
            State::Open
        }
    }

    /// Whether a call should be allowed through right now.
    #[must_use]
    pub fn allow(&self) -> bool {
        !matches!(self.state(), State::Open)
    }

    /// Records a successful call, resetting the failure count.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
    }

    /// Records a failed call; opens the breaker once the threshold is hit.
    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
        if failures == self.failure_threshold {
            self.opened_at_ms.store(Self::now_ms(), Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn opens_after_threshold_then_half_opens_after_cooldown() {
        let breaker = CircuitBreaker::new(3, Duration::from_millis(0));
        assert!(breaker.allow());
        breaker.record_failure();
        breaker.record_failure();
        assert!(breaker.allow());
        breaker.record_failure();
        // cooldown is zero, so it immediately half-opens and allows a trial.
        assert!(breaker.allow());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new(2, Duration::from_secs(60));
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert!(breaker.allow());
    }
}
