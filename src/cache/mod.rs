//! Cache Module
//!
//! Quota-aware persistent TTL cache with protected namespaces, manual purge
//! of secondary metadata and LRU eviction on write failure.

mod clock;
mod entry;
mod eviction;
mod file_medium;
mod key;
mod medium;
pub mod purge;
mod stats;
mod store;
mod token;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use eviction::EvictionPolicy;
pub use file_medium::FileMedium;
pub use key::{CacheKey, KeyClass, KeyClassifier, KeyKind};
pub use medium::{DynMedium, MemoryMedium, StorageMedium};
pub use stats::CacheStats;
pub use store::{CacheStore, SetOutcome, StoreConfig};
pub use token::{
    Authenticator, IssuedToken, TokenCache, TokenPolicy, DEFAULT_TOKEN_SAFETY_MARGIN_MS,
    DEFAULT_TOKEN_VALIDITY_MS,
};

// == Public Constants ==
/// Default byte quota of a medium, shared by all application data
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024; // 5 MB

/// Default ceiling for a single serialized payload
pub const DEFAULT_MAX_ENTRY_BYTES: usize = 2 * 1024 * 1024; // 2 MB

/// Default share of ordinary entries removed per eviction pass
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.3;
