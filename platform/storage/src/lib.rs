//! Persisted local state.
//!
//! A small key/value store in the shape of browser local storage: string keys,
//! string values, no transactions. The session provider is its only writer.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("failed to read `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// One file per key under a state directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        // Write then rename so readers never observe a truncated record.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(write_err)?;
        fs::rename(&staging, &path).map_err(write_err)?;
        debug!(key, path = %path.display(), "stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "removed item");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pulse-storage-{}", uuid::Uuid::new_v4().simple()))
    }

    #[test]
    fn file_storage_round_trips_and_removes() {
        let dir = scratch_dir();
        let storage = FileStorage::new(&dir);
        assert_eq!(storage.get_item("user").unwrap(), None);

        storage.set_item("user", r#"{"username":"ada"}"#).unwrap();
        assert_eq!(
            storage.get_item("user").unwrap().as_deref(),
            Some(r#"{"username":"ada"}"#)
        );
        assert!(!dir.join("user.json.tmp").exists());

        storage.remove_item("user").unwrap();
        storage.remove_item("user").unwrap();
        assert_eq!(storage.get_item("user").unwrap(), None);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let storage = FileStorage::new(scratch_dir());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                storage.set_item(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn memory_storage_behaves_like_local_storage() {
        let storage = MemoryStorage::new().with_item("user", "{}");
        assert_eq!(storage.len(), 1);
        storage.set_item("user", "[]").unwrap();
        assert_eq!(storage.get_item("user").unwrap().as_deref(), Some("[]"));
        storage.remove_item("user").unwrap();
        assert!(storage.is_empty());
    }
}
