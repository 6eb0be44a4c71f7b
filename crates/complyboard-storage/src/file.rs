//! File-backed storage: a flat JSON object rewritten on every mutation.

use crate::{StorageError, StorageResult, TokenStorage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

/// File-backed key/value storage.
///
/// The entire map is held in memory behind a mutex and persisted to the
/// backing file after each mutation, so reads never touch the disk and a
/// write that lands replaces the previous value as a unit.
pub struct FileStorage {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the storage file at the given path.
    pub fn open(path: PathBuf) -> StorageResult<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)
                .map_err(|e| StorageError::Encoding(e.to_string()))?
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), "Opened token storage");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn persist(&self, data: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap();
        data.insert(key.to_string(), value.to_string());
        self.persist(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.lock().unwrap();
        Ok(data.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let mut data = self.data.lock().unwrap();
        let removed = data.remove(key).is_some();
        if removed {
            self.persist(&data)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("tokens.json")).unwrap();

        storage.set("key1", "value1").unwrap();
        assert_eq!(storage.get("key1").unwrap(), Some("value1".to_string()));

        assert!(storage.delete("key1").unwrap());
        assert!(!storage.delete("key1").unwrap());
        assert_eq!(storage.get("key1").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("tokens.json")).unwrap();

        storage.set("token", "old").unwrap();
        storage.set("token", "new").unwrap();
        assert_eq!(storage.get("token").unwrap(), Some("new".to_string()));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        {
            let storage = FileStorage::open(path.clone()).unwrap();
            storage.set("key1", "value1").unwrap();
            storage.set("key2", "value2").unwrap();
        }

        let reopened = FileStorage::open(path).unwrap();
        assert_eq!(reopened.get("key1").unwrap(), Some("value1".to_string()));
        assert_eq!(reopened.get("key2").unwrap(), Some("value2".to_string()));
    }

    #[test]
    fn test_open_creates_parent_dirs_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let storage = FileStorage::open(path.clone()).unwrap();
        storage.set("key", "value").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json at all").unwrap();

        let result = FileStorage::open(path);
        assert!(matches!(result, Err(StorageError::Encoding(_))));
    }
}
