//! Persistent key-value storage.
//!
//! `LocalStorage` keeps string values under string keys in a single JSON
//! file. The task collection is stored under [`TASKS_KEY`] as its CSV
//! encoding. Writes go to a temp file that is renamed into place.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StorageError;
use crate::store::TaskStore;

/// Storage key holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

/// File-backed string map.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open the storage file, starting empty if it doesn't exist yet.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let buf = fs::read_to_string(path).map_err(|source| StorageError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if buf.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&buf).map_err(|source| StorageError::Corrupt {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "storage opened");
        Ok(LocalStorage {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and persist the whole map.
    ///
    /// The in-memory map only changes once the file write succeeded.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value.into());
        self.flush(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source: std::io::Error| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        let data = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        let result = File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(data.as_bytes())?;
                f.flush()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.map_err(io_err)
    }
}

/// Write the store's CSV snapshot under [`TASKS_KEY`].
pub fn save_tasks(storage: &mut LocalStorage, store: &TaskStore) -> Result<(), StorageError> {
    storage.set(TASKS_KEY, store.to_csv())?;
    info!(count = store.len(), path = %storage.path().display(), "tasks saved");
    Ok(())
}

/// The stored CSV snapshot, if one was saved.
pub fn load_tasks_csv(storage: &LocalStorage) -> Option<&str> {
    storage.get(TASKS_KEY)
}
