//! Media Cache - resilient cache layer for a media-tracking client
//!
//! A TTL cache over a quota-bounded persistent medium. User data lives in
//! protected namespaces that are never evicted; secondary metadata can be
//! purged on demand; everything else is evicted least-recently-used when
//! the medium runs out of space.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheKey, CacheStore, KeyClass, KeyKind, SetOutcome};
pub use config::Config;
