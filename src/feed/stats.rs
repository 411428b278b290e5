//! Feed Cache Statistics
//!
//! Lock-free counters describing how feed reads were served.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Feed Stats ==
#[derive(Debug, Default)]
pub struct FeedStats {
    hits: AtomicU64,
    misses: AtomicU64,
    warms: AtomicU64,
    warm_failures: AtomicU64,
    fallbacks: AtomicU64,
    evictions: AtomicU64,
    cache_errors: AtomicU64,
}

/// Point-in-time copy of [`FeedStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatsSnapshot {
    /// Reads that found a cached entry
    pub hits: u64,
    /// Reads that found nothing usable
    pub misses: u64,
    /// Warm-ups attempted
    pub warms: u64,
    /// Warm-ups that failed at the source of truth
    pub warm_failures: u64,
    /// Pages served straight from the source of truth
    pub fallbacks: u64,
    /// Posts dropped from the tail by pushes
    pub evictions: u64,
    /// Cache store failures and timeouts
    pub cache_errors: u64,
}

impl FeedStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_warm(&self) {
        self.warms.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_warm_failure(&self) {
        self.warm_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_cache_error(&self) {
        self.cache_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FeedStatsSnapshot {
        FeedStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            warms: self.warms.load(Ordering::Relaxed),
            warm_failures: self.warm_failures.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            cache_errors: self.cache_errors.load(Ordering::Relaxed),
        }
    }
}
