//! Configuration Module
//!
//! Loads cache and server settings from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{
    EvictionPolicy, KeyClassifier, StoreConfig, DEFAULT_EVICTION_FRACTION,
    DEFAULT_MAX_ENTRY_BYTES, DEFAULT_QUOTA_BYTES,
};

/// Cache and server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Byte quota of the storage medium
    pub quota_bytes: usize,
    /// Largest payload a single `set` may cache
    pub max_entry_bytes: usize,
    /// Share of ordinary entries removed per eviction pass
    pub eviction_fraction: f64,
    /// JSON file backing the medium; in-memory when unset
    pub cache_file: Option<PathBuf>,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_QUOTA_BYTES` - Medium quota in bytes (default: 5 MB)
    /// - `CACHE_MAX_ENTRY_BYTES` - Per-entry ceiling in bytes (default: 2 MB)
    /// - `CACHE_EVICTION_FRACTION` - Eviction share in (0, 1] (default: 0.3)
    /// - `CACHE_FILE` - Path of the persistent cache file (default: in-memory)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let eviction_fraction = parse_var("CACHE_EVICTION_FRACTION")
            .filter(|f: &f64| *f > 0.0 && *f <= 1.0)
            .unwrap_or(defaults.eviction_fraction);

        Self {
            quota_bytes: parse_var("CACHE_QUOTA_BYTES").unwrap_or(defaults.quota_bytes),
            max_entry_bytes: parse_var("CACHE_MAX_ENTRY_BYTES")
                .unwrap_or(defaults.max_entry_bytes),
            eviction_fraction,
            cache_file: env::var("CACHE_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Store tunables derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_entry_bytes: self.max_entry_bytes,
            eviction: EvictionPolicy::new(self.eviction_fraction),
            classifier: KeyClassifier::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            eviction_fraction: DEFAULT_EVICTION_FRACTION,
            cache_file: None,
            server_port: 3000,
        }
    }
}
