//! Cache Entry Module
//!
//! The persisted form of a cached value with its expiry and last-access stamp.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// A single cache entry as stored in the medium.
///
/// Serialized as `{"value": .., "expiry": .., "lastAccessed": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached payload
    pub value: Value,
    /// Absolute expiration timestamp (Unix milliseconds)
    pub expiry: u64,
    /// Last successful read (Unix milliseconds). Entries written without
    /// this field rank as 0, i.e. oldest.
    #[serde(default)]
    pub last_accessed: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_ms`.
    pub fn new(value: Value, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            expiry: now_ms.saturating_add(ttl_ms),
            last_accessed: now_ms,
        }
    }

    // == Is Expired ==
    /// An entry is logically absent once `now` is strictly past its expiry.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expiry
    }

    // == Touch ==
    /// Records a read at `now_ms`. Expiry is left as written.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_accessed = now_ms;
    }

    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expiry.saturating_sub(now_ms)
    }

    // == Encoding ==
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a stored string. Anything that is not an entry yields `None`.
    ///
    /// Only JSON objects qualify; serde would otherwise accept a positional
    /// array such as `["x", 5]` as a struct.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"id": 603}), 1_000, 500);

        assert_eq!(entry.expiry, 1_500);
        assert_eq!(entry.last_accessed, 1_000);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(json!("v"), 1_000, 500);

        // Still valid exactly at expiry, expired one millisecond later
        assert!(!entry.is_expired(1_500));
        assert!(entry.is_expired(1_501));
    }

    #[test]
    fn test_ttl_overflow_saturates() {
        let entry = CacheEntry::new(json!("v"), u64::MAX - 1, 10);
        assert_eq!(entry.expiry, u64::MAX);
    }

    #[test]
    fn test_touch_updates_access_not_expiry() {
        let mut entry = CacheEntry::new(json!("v"), 1_000, 500);

        entry.touch(1_200);

        assert_eq!(entry.last_accessed, 1_200);
        assert_eq!(entry.expiry, 1_500);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!("v"), 1_000, 500);
        assert_eq!(entry.ttl_remaining_ms(1_100), 400);
        assert_eq!(entry.ttl_remaining_ms(2_000), 0);
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let entry = CacheEntry::new(json!([1, 2]), 10, 5);
        let raw = entry.to_json().unwrap();

        assert!(raw.contains("\"lastAccessed\":10"));
        assert!(raw.contains("\"expiry\":15"));
        assert_eq!(CacheEntry::parse(&raw), Some(entry));
    }

    #[test]
    fn test_missing_last_accessed_defaults_to_zero() {
        let entry = CacheEntry::parse(r#"{"value":"v","expiry":99}"#).unwrap();
        assert_eq!(entry.last_accessed, 0);
    }

    #[test]
    fn test_parse_rejects_foreign_values() {
        assert!(CacheEntry::parse("not json").is_none());
        assert!(CacheEntry::parse(r#"{"theme":"dark"}"#).is_none());
        assert!(CacheEntry::parse("[1,2,3]").is_none());
        assert!(CacheEntry::parse(r#"["matrix", 5]"#).is_none());
        assert!(CacheEntry::parse(r#"["matrix", 5, 7]"#).is_none());
        assert!(CacheEntry::parse("42").is_none());
    }
}
