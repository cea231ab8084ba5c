//! Minimal counter/gauge primitives backing [`crate::memory::Memory::stats`].

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A point-in-time value that can rise or fall.
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn set(&self, value: u64) {
        self.0.store(value, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters and gauges backing `Memory::stats()`.
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    pub cache_hits: Counter,
    pub cache_misses: Counter,
    pub cache_used_bytes: Gauge,
    pub cache_entries: Gauge,
    pub embeddings_generated: Counter,
    pub embeddings_from_cache: Counter,
}

impl MemoryTelemetry {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.cache_hits.get() as f64;
        let misses = self.cache_misses.get() as f64;
        if hits + misses == 0.0 {
            0.0
        } else {
            hits / (hits + misses)
        }
    }

    #[must_use]
    pub fn cached_fraction(&self) -> f64 {
        let cached = self.embeddings_from_cache.get() as f64;
        let generated = self.embeddings_generated.get() as f64;
        if cached + generated == 0.0 {
            0.0
        } else {
            cached / (cached + generated)
        }
    }
}
