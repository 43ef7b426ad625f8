//! Directory-backed client storage.
//!
//! Each key maps to one file under the root directory: the `/`-separated
//! segments become nested directories and the last segment gets a `.val`
//! suffix, so `renaissance/session` lives at `<root>/renaissance/session.val`.
//! The suffix keeps `a` and `a/b` from colliding.
//!
//! Writes go to a temporary sibling, are synced, then renamed over the
//! target, so a crash never leaves a half-written record behind. All file
//! system calls run on the Tokio blocking pool.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::{ClientStorage, StorageError};

const VALUE_SUFFIX: &str = ".val";
const TEMP_SUFFIX: &str = ".tmp";

/// Client storage rooted at a directory on disk.
///
/// # Examples
///
/// ```no_run
/// # use renaissance_storage::FileStorage;
/// let storage = FileStorage::open("./.renaissance").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: Arc<PathBuf>,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// the path exists but is not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| StorageError::Open {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        if !root.is_dir() {
            return Err(StorageError::Open {
                path: root.display().to_string(),
                reason: "not a directory".to_owned(),
            });
        }
        Ok(Self {
            root: Arc::new(root.to_path_buf()),
        })
    }

    /// The directory this storage writes into.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run a blocking closure against the root directory.
    async fn blocking<T, F>(
        &self,
        f: F,
        on_panic: impl FnOnce(String) -> StorageError,
    ) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, StorageError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || f(&root))
            .await
            .map_err(|e| on_panic(format!("blocking task panicked: {e}")))?
    }
}

/// Map a key onto its value file, rejecting anything that could escape the
/// root directory.
fn value_path(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let invalid = |reason: &str| StorageError::InvalidKey {
        key: key.to_owned(),
        reason: reason.to_owned(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }

    let segments: Vec<&str> = key.split('/').collect();
    let mut path = root.to_path_buf();
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(invalid("empty path segment"));
        }
        if *segment == "." || *segment == ".." {
            return Err(invalid("relative path segment"));
        }
        if segment.contains(['\\', '\0']) {
            return Err(invalid("segment contains a reserved character"));
        }
        if i + 1 == segments.len() {
            path.push(format!("{segment}{VALUE_SUFFIX}"));
        } else {
            path.push(segment);
        }
    }
    Ok(path)
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.insert(0, '.');
    name.push_str(TEMP_SUFFIX);
    target.with_file_name(name)
}

fn read_value(root: &Path, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
    let path = value_path(root, key)?;
    match fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::Read {
            key: key.to_owned(),
            reason: e.to_string(),
        }),
    }
}

fn write_value(root: &Path, key: &str, value: &[u8]) -> Result<(), StorageError> {
    let path = value_path(root, key)?;
    let write_err = |e: std::io::Error| StorageError::Write {
        key: key.to_owned(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = temp_path(&path);
    let mut file = fs::File::create(&tmp).map_err(write_err)?;
    file.write_all(value).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    debug!(key, bytes = value.len(), "stored value");
    Ok(())
}

fn delete_value(root: &Path, key: &str) -> Result<(), StorageError> {
    let path = value_path(root, key)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Delete {
            key: key.to_owned(),
            reason: e.to_string(),
        }),
    }
}

#[async_trait::async_trait]
impl ClientStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let key = key.to_owned();
        let k = key.clone();
        self.blocking(move |root| read_value(root, &k), |reason| {
            StorageError::Read { key, reason }
        })
        .await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let key = key.to_owned();
        let k = key.clone();
        let value = value.to_vec();
        self.blocking(move |root| write_value(root, &k, &value), |reason| {
            StorageError::Write { key, reason }
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_owned();
        let k = key.clone();
        self.blocking(move |root| delete_value(root, &k), |reason| {
            StorageError::Delete { key, reason }
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("data")).unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn put_then_get_survives_reopen() {
        let (_dir, storage) = open_temp();
        storage.put("renaissance/session", b"{\"username\":\"a\"}").await.unwrap();

        let reopened = FileStorage::open(storage.root()).unwrap();
        let value = reopened.get("renaissance/session").await.unwrap();
        assert_eq!(value, Some(b"{\"username\":\"a\"}".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let (_dir, storage) = open_temp();
        assert_eq!(storage.get("renaissance/content").await.unwrap(), None);
        assert!(!storage.exists("renaissance/content").await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let (_dir, storage) = open_temp();
        storage.delete("renaissance/session").await.unwrap();
        storage.put("renaissance/session", b"x").await.unwrap();
        storage.delete("renaissance/session").await.unwrap();
        assert_eq!(storage.get("renaissance/session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn nested_keys_do_not_collide() {
        let (_dir, storage) = open_temp();
        storage.put("a", b"outer").await.unwrap();
        storage.put("a/b", b"inner").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), Some(b"outer".to_vec()));
        assert_eq!(storage.get("a/b").await.unwrap(), Some(b"inner".to_vec()));
    }

    #[tokio::test]
    async fn no_temp_files_left_after_write() {
        let (_dir, storage) = open_temp();
        storage.put("renaissance/content", b"doc").await.unwrap();
        let names: Vec<String> = fs::read_dir(storage.root().join("renaissance"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["content.val"]);
    }

    #[tokio::test]
    async fn escaping_keys_are_rejected() {
        let (_dir, storage) = open_temp();
        for key in ["", "../outside", "a//b", "a/./b", "a\\b", "trailing/"] {
            let result = storage.put(key, b"x").await;
            assert!(
                matches!(result, Err(StorageError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn open_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            FileStorage::open(&file),
            Err(StorageError::Open { .. })
        ));
    }
}
