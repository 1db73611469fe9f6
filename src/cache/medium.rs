//! Storage Medium Module
//!
//! The persistent key-value medium shared by every kind of application data,
//! and its in-memory, quota-bounded implementation.

use std::collections::HashMap;

use crate::error::MediumError;

// == Storage Medium ==
/// A string key-value store with a fixed byte quota.
///
/// Each call is atomic per key: a failed `set_item` leaves the previous
/// value (or absence) in place.
pub trait StorageMedium {
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, failing with
    /// [`MediumError::QuotaExceeded`] when total usage would pass the quota.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError>;

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError>;

    /// Snapshot of every key currently stored.
    fn keys(&self) -> Vec<String>;

    /// Bytes currently used (keys plus values).
    fn used_bytes(&self) -> usize;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Medium type used where the concrete backend is picked at runtime.
pub type DynMedium = Box<dyn StorageMedium + Send + Sync>;

impl<M: StorageMedium + ?Sized> StorageMedium for Box<M> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }

    fn used_bytes(&self) -> usize {
        (**self).used_bytes()
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

// == Quota Accounting ==
/// Key-value map with running byte usage, shared by the medium backends.
#[derive(Debug, Default, Clone)]
pub(crate) struct QuotaMap {
    items: HashMap<String, String>,
    used: usize,
    quota: usize,
}

impl QuotaMap {
    pub(crate) fn new(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            used: 0,
            quota,
        }
    }

    pub(crate) fn from_items(items: HashMap<String, String>, quota: usize) -> Self {
        let used = items.iter().map(|(k, v)| k.len() + v.len()).sum();
        Self { items, used, quota }
    }

    pub(crate) fn items(&self) -> &HashMap<String, String> {
        &self.items
    }

    pub(crate) fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    /// Usage after replacing `key` with `value`, or the quota error.
    pub(crate) fn check(&self, key: &str, value: &str) -> Result<usize, MediumError> {
        let released = self.items.get(key).map_or(0, |old| key.len() + old.len());
        let needed = self.used - released + key.len() + value.len();
        if needed > self.quota {
            return Err(MediumError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }
        Ok(needed)
    }

    /// Inserts and returns the previous value. Call `check` first.
    pub(crate) fn insert(&mut self, key: &str, value: &str, new_used: usize) -> Option<String> {
        self.used = new_used;
        self.items.insert(key.to_string(), value.to_string())
    }

    /// Restores a previous state of `key` after a failed flush.
    pub(crate) fn restore(&mut self, key: &str, previous: Option<String>) {
        match previous {
            Some(old) => {
                let added = old.len();
                match self.items.insert(key.to_string(), old) {
                    Some(current) => self.used = self.used - current.len() + added,
                    None => self.used += key.len() + added,
                }
            }
            None => {
                self.remove(key);
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.items.remove(key);
        if let Some(old) = &removed {
            self.used -= key.len() + old.len();
        }
        removed
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

// == Memory Medium ==
/// In-memory medium with a byte quota.
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    map: QuotaMap,
}

impl MemoryMedium {
    // == Constructor ==
    /// Creates an empty medium holding at most `quota_bytes`.
    pub fn new(quota_bytes: usize) -> Self {
        Self {
            map: QuotaMap::new(quota_bytes),
        }
    }

    pub fn quota_bytes(&self) -> usize {
        self.map.quota
    }
}

impl StorageMedium for MemoryMedium {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.get(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        let new_used = self.map.check(key, value)?;
        self.map.insert(key, value, new_used);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError> {
        self.map.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.map.keys()
    }

    fn used_bytes(&self) -> usize {
        self.map.used()
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
