//! Durable key/value storage

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::StudioError;
use crate::filesys::dir::Dir;

/// Durable string storage keyed by a namespaced name
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the entry, `None` when it was never written or has been removed
    async fn get(&self, key: &str) -> Result<Option<String>, StudioError>;

    /// Write the entry, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StudioError>;

    /// Remove the entry. Removing a missing entry succeeds.
    async fn remove(&self, key: &str) -> Result<(), StudioError>;
}

/// Stores each key as one owner-only file in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: Dir,
}

impl FileStore {
    pub fn new(dir: Dir) -> Self {
        Self { dir }
    }
}

fn check_key(key: &str) -> Result<(), StudioError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StudioError::StorageError(format!("Invalid storage key: {:?}", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StudioError> {
        check_key(key)?;
        self.dir.file(key).read_string_opt().await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StudioError> {
        check_key(key)?;
        self.dir.file(key).write_private(value.as_bytes()).await
    }

    async fn remove(&self, key: &str) -> Result<(), StudioError> {
        check_key(key)?;
        self.dir.file(key).delete().await
    }
}

/// Process-local store, used by tests and by callers that opt out of persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StudioError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StudioError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StudioError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
