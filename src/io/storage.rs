use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Error type for key/value storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not remove {path}: {source}")]
    RemoveError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize value for key {key}: {source}")]
    SerializeError {
        key: String,
        source: serde_json::Error,
    },
}

/// Client-local persistent storage: a flat set of string values under
/// fixed keys. Every `set` rewrites the value wholesale; readers see
/// exactly what was last written.
pub trait KeyStorage: Send + Sync {
    /// Read the value at `key`. Missing or unreadable values yield `None`.
    fn get(&self, key: &str) -> Option<String>;
    /// Write the value at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete the value at `key`. Deleting a missing key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one `<key>.json` file per key inside a data
/// directory, created on first write.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStorage { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteError {
                path: path.clone(),
                source: e,
            })?;
        }
        fs::write(&path, value).map_err(|e| StorageError::WriteError { path, source: e })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::RemoveError { path, source: e }),
        }
    }
}

/// In-memory storage, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl KeyStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Read a JSON value stored under `key`. Missing or malformed values
/// yield `None` — a corrupt entry is treated the same as absence.
pub fn read_json<T: serde::de::DeserializeOwned>(storage: &dyn KeyStorage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    serde_json::from_str(&raw).ok()
}

/// Serialize `value` and write it under `key`, replacing the old value.
/// Nothing is written when serialization fails.
pub fn write_json<T: serde::Serialize>(
    storage: &dyn KeyStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw =
        serde_json::to_string_pretty(value).map_err(|e| StorageError::SerializeError {
            key: key.to_string(),
            source: e,
        })?;
    storage.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        write_json(&storage, "tasks", &vec!["a", "b"]).unwrap();
        let loaded: Vec<String> = read_json(&storage, "tasks").unwrap();
        assert_eq!(loaded, vec!["a", "b"]);
    }

    #[test]
    fn missing_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.get("session").is_none());
        assert!(read_json::<Vec<String>>(&storage, "session").is_none());
    }

    #[test]
    fn malformed_value_reads_none() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        storage.set("tasks", "not json {{{").unwrap();
        assert!(read_json::<Vec<String>>(&storage, "tasks").is_none());
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        storage.remove("session").unwrap();
    }

    #[test]
    fn unserializable_value_errors_and_writes_nothing() {
        let storage = MemoryStorage::new();
        // Maps with non-string keys have no JSON representation
        let value: HashMap<Vec<u8>, u8> = HashMap::from([(vec![1], 1)]);
        let err = write_json(&storage, "bad", &value).unwrap_err();
        assert!(matches!(err, StorageError::SerializeError { .. }));
        assert!(storage.get("bad").is_none());
    }

    #[test]
    fn set_replaces_previous_value() {
        let storage = MemoryStorage::new();
        storage.set("tasks", "[1]").unwrap();
        storage.set("tasks", "[1,2]").unwrap();
        assert_eq!(storage.get("tasks").as_deref(), Some("[1,2]"));
    }
}
