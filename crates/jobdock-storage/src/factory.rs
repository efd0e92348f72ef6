//! Config-driven construction of the storage backend.

use std::sync::Arc;

use jobdock_core::{Config, StorageBackend};

use crate::local::LocalStorage;
use crate::s3::S3Storage;
use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// Build the configured storage backend. Defaults to S3 when no backend
/// is selected explicitly.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn ObjectStorage>> {
    let backend = config.storage_backend.unwrap_or(StorageBackend::S3);
    match backend {
        StorageBackend::S3 => {
            let bucket = config.s3_bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_BUCKET must be set for S3 storage".to_string())
            })?;
            let region = config
                .s3_region
                .clone()
                .or_else(|| config.aws_region.clone())
                .ok_or_else(|| {
                    StorageError::ConfigError(
                        "S3_REGION or AWS_REGION must be set for S3 storage".to_string(),
                    )
                })?;
            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Local => {
            let path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "LOCAL_STORAGE_PATH must be set for local storage".to_string(),
                )
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "LOCAL_STORAGE_BASE_URL must be set for local storage".to_string(),
                )
            })?;
            let storage = LocalStorage::new(path, base_url)?;
            Ok(Arc::new(storage))
        }
    }
}
