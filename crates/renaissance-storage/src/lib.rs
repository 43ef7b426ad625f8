//! Durable client storage for Digital Renaissance.
//!
//! This crate defines the [`ClientStorage`] trait, the stand-in for browser
//! local storage: a small key-value store that survives a reload. It knows
//! nothing about documents or sessions; the stores in `renaissance-core`
//! serialize their own records before handing bytes to this layer.
//!
//! Two implementations are provided:
//!
//! - [`FileStorage`]: one file per key under a root directory, used by the CLI
//! - [`MemoryStorage`]: in-memory, for tests and simulated reloads

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Where a page keeps records that must outlive it.
///
/// The session store writes `renaissance/session` and the content store
/// writes `renaissance/content`. Each record is a whole JSON value, always
/// replaced in one `put`, so backends never see partial updates. Backends
/// are shared by both stores through an `Arc`.
#[async_trait::async_trait]
pub trait ClientStorage: Send + Sync + 'static {
    /// The record under `key`, or `None` if nothing was ever written there.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] for keys the backend cannot address,
    /// [`StorageError::Read`] when the record exists but cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write the whole record under `key`.
    ///
    /// A failed write leaves the previous record readable.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] or [`StorageError::Write`].
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Forget the record under `key`. Succeeds when there was none.
    ///
    /// # Errors
    ///
    /// [`StorageError::InvalidKey`] or [`StorageError::Delete`].
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Whether a record is stored under `key`.
    ///
    /// # Errors
    ///
    /// As [`get`](ClientStorage::get).
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}
