//! Translator metrics and observability.
//!
//! Tracks lookup-cache hit rates and namespace load outcomes for one
//! translator instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters owned by a single translator.
#[derive(Debug, Default)]
pub struct TranslatorMetrics {
    /// Number of lookups answered from the lookup cache
    cache_hits: AtomicUsize,

    /// Number of lookups that had to walk the namespace store
    cache_misses: AtomicUsize,

    /// Number of namespace loads that produced data
    loads: AtomicUsize,

    /// Number of namespace loads that failed after retries
    load_failures: AtomicUsize,
}

impl TranslatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a lookup-cache hit.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup-cache miss.
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful namespace load.
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a namespace load failure.
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> usize {
        self.load_failures.load(Ordering::Relaxed)
    }

    /// Zero the cache counters; load counters are kept.
    pub fn reset_cache_counters(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let loads = self.loads();
        let failures = self.load_failures();
        let attempts = loads + failures;
        let load_success_rate = if attempts > 0 {
            (loads as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            loads,
            load_failures: failures,
            load_success_rate,
        }
    }
}

/// Metrics report containing current translator statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    /// Number of cache hits
    pub cache_hits: usize,

    /// Number of cache misses
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    /// Number of successful namespace loads
    pub loads: usize,

    /// Number of failed namespace loads
    pub load_failures: usize,

    /// Load success rate as a percentage (0-100)
    pub load_success_rate: f64,
}
