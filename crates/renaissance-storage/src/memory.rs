//! Process-local client storage.
//!
//! A reload in tests is a fresh `SiteState` built over a clone of the
//! storage the previous page wrote to; clones share one map.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{ClientStorage, StorageError};

/// Records keyed by name, shared between clones.
///
/// # Examples
///
/// ```
/// # use renaissance_storage::{ClientStorage, MemoryStorage};
/// # #[tokio::main]
/// # async fn main() {
/// let storage = MemoryStorage::new();
/// storage.put("renaissance/session", b"{}").await.unwrap();
/// assert!(storage.exists("renaissance/session").await.unwrap());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// No records yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many records are stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True until the first `put`, and again once every record is deleted.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.read().await.contains_key(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("renaissance/session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_replaces_previous_value() {
        let storage = MemoryStorage::new();
        storage.put("k", b"first").await.unwrap();
        storage.put("k", b"second").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.put("k", b"v").await.unwrap();
        storage.delete("k").await.unwrap();
        storage.delete("k").await.unwrap();
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn clones_see_each_others_writes() {
        let storage = MemoryStorage::new();
        let reloaded = storage.clone();
        storage.put("k", b"v").await.unwrap();
        assert!(reloaded.exists("k").await.unwrap());
    }
}
