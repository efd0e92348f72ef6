//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends
//! must implement.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use jobdock_core::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for jobdock_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) | StorageError::InvalidExpiry(msg) => {
                jobdock_core::AppError::InvalidInput(msg)
            }
            other => jobdock_core::AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The ingest service works against `Arc<dyn ObjectStorage>` and is never
/// coupled to a specific backend.
///
/// **Key format:** `jobs/{uuid}{ext}`, generated by `put` via
/// [`crate::keys::generate_object_key`].
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Make sure the backing container (bucket or directory) exists.
    ///
    /// Returns `true` when the container exists or was created. Failures
    /// are logged and reported as `false`, never as an error; callers
    /// decide whether that is fatal.
    async fn ensure_bucket(&self) -> bool;

    /// Store a blob under a freshly generated key and return that key.
    ///
    /// The stored content type follows the fallback chain: explicit value
    /// if given, then a guess from the filename extension, then
    /// `application/octet-stream`.
    async fn put(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> StorageResult<String>;

    /// Fetch a blob by key. A missing object is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Delete a blob by key. Returns whether an object was actually
    /// removed; deleting an absent key is `Ok(false)`.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Generate a presigned/temporary GET URL for direct access.
    ///
    /// `expires_in` must be positive.
    async fn presign(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
