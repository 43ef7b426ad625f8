//! Storage error types.

/// Errors that can occur while reading or writing client storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage root could not be created or opened.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Failed to read a value.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value (quota, permissions, full disk).
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to delete a key.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}
