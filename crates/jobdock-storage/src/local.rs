use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use jobdock_core::StorageBackend;

use crate::keys::{generate_object_key, resolve_content_type};
use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// Local filesystem storage implementation, used in development and tests.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Map a storage key to a path under the base directory. Keys that
    /// would escape the base directory are rejected.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if Path::new(key)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn ensure_bucket(&self) -> bool {
        match tokio::fs::create_dir_all(&self.base_path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, path = %self.base_path.display(), "failed to create storage directory");
                false
            }
        }
    }

    async fn put(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        let key = generate_object_key(original_filename);
        let resolved_type = resolve_content_type(content_type, original_filename);
        let path = self.key_to_path(&key)?;
        let size = data.len() as u64;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        tracing::info!(
            key = %key,
            size_bytes = size,
            content_type = %resolved_type,
            "local upload successful"
        );

        Ok(key)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.key_to_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "local delete successful");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn presign(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if expires_in.is_zero() {
            return Err(StorageError::InvalidExpiry(
                "expiry must be positive".to_string(),
            ));
        }
        // Local URLs are plain; there is no signature or real expiry.
        self.key_to_path(key)?;
        Ok(format!("{}/{}", self.base_url, key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:4000/files".to_string(),
        )
        .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let (_dir, storage) = test_storage();
        let key = storage
            .put(b"hello world".to_vec(), "greeting.txt", None)
            .await
            .unwrap();
        assert!(key.starts_with("jobs/"));
        assert!(key.ends_with(".txt"));

        let data = storage.get(&key).await.unwrap();
        assert_eq!(data, Some(b"hello world".to_vec()));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let (_dir, storage) = test_storage();
        assert_eq!(storage.get("jobs/absent.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_object_existed() {
        let (_dir, storage) = test_storage();
        let key = storage.put(b"bye".to_vec(), "x.txt", None).await.unwrap();
        assert!(storage.delete(&key).await.unwrap());
        assert!(!storage.delete(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let (_dir, storage) = test_storage();
        assert!(matches!(
            storage.get("../outside.txt").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.get("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_presign_requires_positive_expiry() {
        let (_dir, storage) = test_storage();
        let key = storage.put(b"x".to_vec(), "x.txt", None).await.unwrap();

        assert!(matches!(
            storage.presign(&key, Duration::ZERO).await,
            Err(StorageError::InvalidExpiry(_))
        ));

        let url = storage
            .presign(&key, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(url, format!("http://localhost:4000/files/{}", key));
    }

    #[tokio::test]
    async fn test_ensure_bucket_is_idempotent() {
        let (_dir, storage) = test_storage();
        assert!(storage.ensure_bucket().await);
        assert!(storage.ensure_bucket().await);
    }
}
