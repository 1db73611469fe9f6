//! Cache Store Module
//!
//! TTL cache over a quota-bounded medium with size admission, lazy expiry,
//! last-access bookkeeping and evict-then-retry on quota failure.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{
    purge, CacheEntry, CacheKey, CacheStats, Clock, EvictionPolicy, KeyClass, KeyClassifier,
    StorageMedium, SystemClock, DEFAULT_MAX_ENTRY_BYTES,
};

// == Store Config ==
/// Tunables injected into a [`CacheStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Largest serialized payload accepted by `set`
    pub max_entry_bytes: usize,
    /// Pass run when the medium reports quota exhaustion
    pub eviction: EvictionPolicy,
    /// Prefix sets deciding what eviction and purge may touch
    pub classifier: KeyClassifier,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            eviction: EvictionPolicy::default(),
            classifier: KeyClassifier::default(),
        }
    }
}

// == Set Outcome ==
/// Result of a cache write. None of these is an error for the caller:
/// anything but `Stored` means "carry on without caching".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The entry was persisted, possibly after one eviction pass
    Stored,
    /// The payload exceeds the per-entry ceiling; nothing was attempted
    Rejected { size: usize, limit: usize },
    /// The medium refused the write, including the retry after eviction
    Failed,
}

impl SetOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, SetOutcome::Stored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SetOutcome::Stored => "stored",
            SetOutcome::Rejected { .. } => "rejected",
            SetOutcome::Failed => "failed",
        }
    }
}

// == Cache Store ==
/// The cache every metadata fetcher shares.
///
/// Created once and handed to collaborators; nothing reaches the medium
/// except through it.
pub struct CacheStore<M> {
    /// Persistent key-value medium
    medium: M,
    /// Size ceiling, eviction policy and classifier
    config: StoreConfig,
    /// Source of timestamps
    clock: Arc<dyn Clock>,
    /// Diagnostic counters
    stats: CacheStats,
}

impl<M: StorageMedium> CacheStore<M> {
    // == Constructor ==
    /// Creates a store over `medium`.
    pub fn new(medium: M, config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            medium,
            config,
            clock,
            stats: CacheStats::new(),
        }
    }

    /// Creates a store with default tunables and the system clock.
    pub fn with_defaults(medium: M) -> Self {
        Self::new(medium, StoreConfig::default(), Arc::new(SystemClock))
    }

    // == Get ==
    /// Returns the cached value for `key`, or `None` on a miss.
    ///
    /// Expired entries, and entries that cannot be decoded as `T`, are
    /// deleted on the way out. A protected entry of the wrong shape is
    /// reported as a miss but kept.
    pub fn get<T: DeserializeOwned>(&mut self, key: &CacheKey) -> Option<T> {
        let value = self.load(key.as_str())?;
        match serde_json::from_value(value) {
            Ok(decoded) => {
                self.stats.record_hit();
                Some(decoded)
            }
            Err(e) => {
                self.stats.record_corrupt();
                if self.classify(key) == KeyClass::Protected {
                    // Owned by a collaborator that may read it with another type
                    debug!("Entry {} does not decode as requested: {}", key, e);
                } else {
                    debug!("Dropping undecodable entry {}: {}", key, e);
                    self.discard(key.as_str());
                }
                None
            }
        }
    }

    /// Like [`get`](Self::get) but returns the stored JSON untouched.
    pub fn get_raw(&mut self, key: &CacheKey) -> Option<Value> {
        let value = self.load(key.as_str())?;
        self.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Caches `value` under `key` for `ttl_ms` milliseconds.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &CacheKey, value: &T, ttl_ms: u64) -> SetOutcome {
        match serde_json::to_value(value) {
            Ok(value) => self.set_raw(key, value, ttl_ms),
            Err(e) => {
                warn!("Cannot serialize value for {}: {}", key, e);
                self.stats.record_failed_write();
                SetOutcome::Failed
            }
        }
    }

    /// Caches an already-built JSON value.
    pub fn set_raw(&mut self, key: &CacheKey, value: Value, ttl_ms: u64) -> SetOutcome {
        let size = value.to_string().len();
        let limit = self.config.max_entry_bytes;
        if size > limit {
            warn!(
                "Rejected {}: payload of {} bytes exceeds the {} byte ceiling",
                key, size, limit
            );
            // A stale ordinary value would outlive the refused one; protected
            // data belongs to its owner and stays
            if self.classify(key) != KeyClass::Protected {
                self.discard(key.as_str());
            }
            self.stats.record_rejected();
            return SetOutcome::Rejected { size, limit };
        }

        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms);
        let raw = match entry.to_json() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cannot encode entry for {}: {}", key, e);
                self.stats.record_failed_write();
                return SetOutcome::Failed;
            }
        };

        match self.medium.set_item(key.as_str(), &raw) {
            Ok(()) => return SetOutcome::Stored,
            Err(e) if e.is_quota_exceeded() => {
                debug!("Quota exhausted writing {}: {}", key, e);
            }
            Err(e) => {
                warn!("Write of {} failed: {}", key, e);
                self.stats.record_failed_write();
                return SetOutcome::Failed;
            }
        }

        self.run_eviction();

        match self.medium.set_item(key.as_str(), &raw) {
            Ok(()) => SetOutcome::Stored,
            Err(e) => {
                warn!("Write of {} failed after eviction, continuing uncached: {}", key, e);
                self.stats.record_failed_write();
                SetOutcome::Failed
            }
        }
    }

    // == Remove Key ==
    /// Deletes `key` unconditionally.
    pub fn remove_key(&mut self, key: &CacheKey) {
        self.discard(key.as_str());
    }

    // == Purge Secondary ==
    /// Deletes every purgeable entry. Returns the number removed.
    pub fn purge_secondary(&mut self) -> usize {
        let removed = purge::purge_secondary(&mut self.medium, &self.config.classifier);
        self.stats.record_purge(removed);
        info!("Purged {} secondary metadata entries", removed);
        removed
    }

    // == Accessors ==
    pub fn classify(&self, key: &CacheKey) -> KeyClass {
        self.config.classifier.classify(key.as_str())
    }

    /// Current "now" as seen by this store.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Direct medium access, for collaborators that own their own keys.
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_usage(self.medium.len(), self.medium.used_bytes());
        stats
    }

    pub fn len(&self) -> usize {
        self.medium.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medium.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.medium.used_bytes()
    }

    // == Internals ==
    /// Reads, validates and touches the entry for `key`.
    fn load(&mut self, key: &str) -> Option<Value> {
        let Some(raw) = self.medium.get_item(key) else {
            self.stats.record_miss();
            return None;
        };

        let Some(mut entry) = CacheEntry::parse(&raw) else {
            debug!("Dropping unparseable entry {}", key);
            self.discard(key);
            self.stats.record_corrupt();
            return None;
        };

        let now = self.clock.now_ms();
        if entry.is_expired(now) {
            debug!("Entry {} expired at {}", key, entry.expiry);
            self.discard(key);
            self.stats.record_expired();
            return None;
        }

        entry.touch(now);
        match entry.to_json() {
            Ok(touched) => {
                if let Err(e) = self.medium.set_item(key, &touched) {
                    debug!("Could not record access to {}: {}", key, e);
                }
            }
            Err(e) => debug!("Could not record access to {}: {}", key, e),
        }

        Some(entry.value)
    }

    fn discard(&mut self, key: &str) {
        if let Err(e) = self.medium.remove_item(key) {
            warn!("Failed to remove {}: {}", key, e);
        }
    }

    fn run_eviction(&mut self) -> usize {
        let removed = self
            .config
            .eviction
            .evict(&mut self.medium, &self.config.classifier);
        self.stats.record_eviction_pass(removed);
        info!(
            "Eviction pass removed {} entries ({} remain, {} bytes used)",
            removed,
            self.medium.len(),
            self.medium.used_bytes()
        );
        removed
    }
}
