//! File Medium Module
//!
//! Quota-bounded medium persisted as a single JSON object on disk.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::medium::{QuotaMap, StorageMedium};
use crate::error::MediumError;

// == File Medium ==
/// Medium whose contents survive restarts.
///
/// The whole map is rewritten after every mutation through a temporary file
/// and a rename, so the file on disk is always a complete snapshot.
#[derive(Debug)]
pub struct FileMedium {
    path: PathBuf,
    map: QuotaMap,
}

impl FileMedium {
    // == Constructor ==
    /// Opens (or starts) the medium stored at `path`.
    ///
    /// A missing file starts empty. A file that is not a JSON string map is
    /// logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>, quota_bytes: usize) -> Result<Self, MediumError> {
        let path = path.into();
        let items = match Self::load(&path) {
            Ok(items) => items,
            Err(MediumError::Corrupt(reason)) => {
                warn!("Ignoring unreadable cache file {}: {}", path.display(), reason);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        debug!("Opened cache file {} with {} keys", path.display(), items.len());

        Ok(Self {
            map: QuotaMap::from_items(items, quota_bytes),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<HashMap<String, String>, MediumError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|e| MediumError::Corrupt(e.to_string()))
    }

    fn flush(&self) -> Result<(), MediumError> {
        let json = serde_json::to_string(self.map.items())
            .map_err(|e| MediumError::Corrupt(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl StorageMedium for FileMedium {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.get(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), MediumError> {
        let new_used = self.map.check(key, value)?;
        let previous = self.map.insert(key, value, new_used);

        if let Err(e) = self.flush() {
            self.map.restore(key, previous);
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), MediumError> {
        let Some(previous) = self.map.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.flush() {
            self.map.restore(key, Some(previous));
            return Err(e);
        }
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
