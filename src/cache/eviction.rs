//! Eviction Policy Module
//!
//! Least-recently-used eviction over the `Ordinary` keys of a medium, run
//! only after the medium refuses a write for lack of space.

use tracing::{debug, warn};

use crate::cache::{CacheEntry, KeyClass, KeyClassifier, StorageMedium, DEFAULT_EVICTION_FRACTION};

// == Eviction Policy ==
/// Removes the least recently accessed fraction of `Ordinary` entries.
///
/// The fraction is a tuning constant: large enough that the retried write
/// and the writes after it fit without another pass, small enough to keep
/// most of the cache warm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvictionPolicy {
    fraction: f64,
}

impl EvictionPolicy {
    // == Constructor ==
    /// Creates a policy evicting `fraction` of candidates per pass.
    ///
    /// Values outside `(0, 1]` fall back to the default fraction.
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction > 0.0 && fraction <= 1.0 {
            fraction
        } else {
            DEFAULT_EVICTION_FRACTION
        };
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Number of entries one pass removes out of `candidates`.
    pub fn quota_for(&self, candidates: usize) -> usize {
        ((candidates as f64 * self.fraction).ceil() as usize).min(candidates)
    }

    // == Evict ==
    /// Runs one eviction pass and returns the number of entries removed.
    ///
    /// Protected and purgeable keys are never candidates. Values that do not
    /// parse as a [`CacheEntry`] are skipped, not deleted.
    pub fn evict<M>(&self, medium: &mut M, classifier: &KeyClassifier) -> usize
    where
        M: StorageMedium + ?Sized,
    {
        let mut candidates: Vec<(u64, String)> = medium
            .keys()
            .into_iter()
            .filter(|key| classifier.classify(key) == KeyClass::Ordinary)
            .filter_map(|key| {
                let entry = CacheEntry::parse(&medium.get_item(&key)?)?;
                Some((entry.last_accessed, key))
            })
            .collect();

        // Oldest first; key order breaks ties so passes are deterministic
        candidates.sort();

        let target = self.quota_for(candidates.len());
        let mut removed = 0;
        for (last_accessed, key) in candidates.into_iter().take(target) {
            match medium.remove_item(&key) {
                Ok(()) => {
                    debug!("Evicted {} (last accessed {})", key, last_accessed);
                    removed += 1;
                }
                Err(e) => warn!("Failed to evict {}: {}", key, e),
            }
        }
        removed
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EVICTION_FRACTION)
    }
}
