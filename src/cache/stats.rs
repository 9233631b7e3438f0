//! Cache Statistics Module
//!
//! Tracks engine counters: hits per tier, misses, writes and invalidations.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Recorder ==
/// Lock-free counters updated by the engine on every operation.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    invalidated_tags: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_local_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_hit(&self) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidated_tag(&self) {
        self.invalidated_tags.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Captures the counters together with gauges supplied by the engine.
    pub fn snapshot(&self, local_entries: usize, tags: usize, remote_failures: u64) -> CacheStats {
        CacheStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            invalidated_tags: self.invalidated_tags.load(Ordering::Relaxed),
            remote_failures,
            local_entries,
            tags,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of the engine counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads served by the local tier
    pub local_hits: u64,
    /// Reads served by the remote tier (and warmed locally)
    pub remote_hits: u64,
    /// Reads that found nothing in either tier
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Tags swept by invalidation
    pub invalidated_tags: u64,
    /// Remote operations that failed or timed out
    pub remote_failures: u64,
    /// Entries currently held by the local tier
    pub local_entries: usize,
    /// Tags currently tracked
    pub tags: usize,
}

impl CacheStats {
    /// Total hits across both tiers.
    pub fn hits(&self) -> u64 {
        self.local_hits + self.remote_hits
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsRecorder::new().snapshot(0, 0, 0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_both_tiers() {
        let recorder = StatsRecorder::new();
        recorder.record_local_hit();
        recorder.record_remote_hit();
        recorder.record_miss();
        recorder.record_miss();

        let stats = recorder.snapshot(3, 1, 0);
        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.local_entries, 3);
        assert_eq!(stats.tags, 1);
    }

    #[test]
    fn test_write_counters() {
        let recorder = StatsRecorder::new();
        recorder.record_set();
        recorder.record_set();
        recorder.record_delete();
        recorder.record_invalidated_tag();

        let stats = recorder.snapshot(0, 0, 7);
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.deletes, 1);
        assert_eq!(stats.invalidated_tags, 1);
        assert_eq!(stats.remote_failures, 7);
    }
}
