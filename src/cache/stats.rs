//! Cache Statistics Module
//!
//! Diagnostic counters for reads, writes, eviction passes and purges.

use serde::Serialize;

// == Cache Stats ==
/// Cache counters. Diagnostics only; no behavior depends on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned nothing (absent, expired or corrupt)
    pub misses: u64,
    /// Entries removed lazily because a read found them expired
    pub expired: u64,
    /// Entries removed because they could not be decoded
    pub corrupt: u64,
    /// Writes refused for exceeding the per-entry size ceiling
    pub rejected: u64,
    /// Writes that still failed after the eviction retry
    pub failed_writes: u64,
    /// Eviction passes run after a quota failure
    pub eviction_passes: u64,
    /// Entries removed by eviction passes
    pub evicted: u64,
    /// Entries removed by manual purges
    pub purged: u64,
    /// Current number of keys in the medium
    pub total_entries: usize,
    /// Current bytes used in the medium
    pub used_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self) {
        self.expired += 1;
        self.misses += 1;
    }

    pub fn record_corrupt(&mut self) {
        self.corrupt += 1;
        self.misses += 1;
    }

    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }

    pub fn record_failed_write(&mut self) {
        self.failed_writes += 1;
    }

    // == Record Eviction Pass ==
    /// Counts one eviction pass and the entries it removed.
    pub fn record_eviction_pass(&mut self, removed: usize) {
        self.eviction_passes += 1;
        self.evicted += removed as u64;
    }

    pub fn record_purge(&mut self, removed: usize) {
        self.purged += removed as u64;
    }

    // == Update Medium Usage ==
    pub fn set_usage(&mut self, total_entries: usize, used_bytes: usize) {
        self.total_entries = total_entries;
        self.used_bytes = used_bytes;
    }
}
