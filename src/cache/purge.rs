//! Manual Purge Module
//!
//! User-initiated removal of all purgeable secondary metadata.

use tracing::warn;

use crate::cache::{KeyClass, KeyClassifier, StorageMedium};

/// Deletes every `Purgeable` key and returns how many were removed.
///
/// Protected and ordinary keys are untouched. Running it with nothing to
/// purge is a no-op.
pub fn purge_secondary<M>(medium: &mut M, classifier: &KeyClassifier) -> usize
where
    M: StorageMedium + ?Sized,
{
    let mut removed = 0;
    for key in medium.keys() {
        if classifier.classify(&key) != KeyClass::Purgeable {
            continue;
        }
        match medium.remove_item(&key) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to purge {}: {}", key, e),
        }
    }
    removed
}
