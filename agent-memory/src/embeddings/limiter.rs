//! Global concurrency and token-rate gating for outbound embedding calls
//!.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounds in-flight embedding calls and the rate of tokens spent on them.
pub struct EmbeddingLimiter {
    concurrency: Semaphore,
    bucket: Mutex<TokenBucket>,
}

struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(tokens_per_minute: u32) -> Self {
        let capacity = f64::from(tokens_per_minute);
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec: capacity / 60.0,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let elapsed = self.last_refill.elapsed().as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = Instant::now();
    }

    fn try_take(&mut self, amount: u32) -> bool {
        self.refill();
        if self.tokens >= f64::from(amount) {
            self.tokens -= f64::from(amount);
            true
        } else {
            false
        }
    }
}

impl EmbeddingLimiter {
    /// `max_concurrent` defaults to 10 in-flight requests per spec §5.
    #[must_use]
    pub fn new(max_concurrent: usize, tokens_per_minute: u32) -> Self {
        Self {
            concurrency: Semaphore::new(max_concurrent),
            bucket: Mutex::new(TokenBucket::new(tokens_per_minute)),
        }
    }

    #[must_use]
    pub fn default_limits() -> Self {
        Self::new(10, 1_000_000)
    }

    /// Acquires a concurrency slot and waits until `estimated_tokens` are
    /// available in the token bucket.
    pub async fn acquire(&self, estimated_tokens: u32) -> SemaphorePermit<'_> {
        let permit = self
            .concurrency
            .acquire()
            .await
            .expect("embedding limiter semaphore is never closed");
        loop {
            let ready = {
                let mut bucket = self.bucket.lock().expect("token bucket mutex poisoned");
                bucket.try_take(estimated_tokens)
            };
            if ready {
                return permit;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_grants_permit_when_tokens_available() {
        let limiter = EmbeddingLimiter::new(2, 1000);
        let _permit = limiter.acquire(10).await;
    }
}
