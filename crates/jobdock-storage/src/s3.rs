use std::time::Duration;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use jobdock_core::StorageBackend;

use crate::keys::{generate_object_key, resolve_content_type};
use crate::traits::{ObjectStorage, StorageError, StorageResult};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config.clone())
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            // S3-compatible providers need path-style addressing (MinIO etc.)
            let mut s3_config_builder = aws_sdk_s3::Config::builder()
                .endpoint_url(endpoint)
                .region(config.region().cloned())
                .retry_config(retry_config);
            if let Some(provider) = config.credentials_provider().into_iter().next() {
                s3_config_builder = s3_config_builder.credentials_provider(provider);
            }
            s3_config_builder = s3_config_builder.force_path_style(true);

            Client::from_conf(s3_config_builder.build())
        } else {
            Client::new(&config)
        };

        Ok(S3Storage { client, bucket })
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn ensure_bucket(&self) -> bool {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return true;
        }

        match self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "created bucket");
                true
            }
            Err(e) => {
                // Concurrent creation is fine; anything else is reported
                // as false and left to the caller.
                let already_exists = matches!(
                    &e,
                    SdkError::ServiceError(service_err)
                        if service_err.err().is_bucket_already_owned_by_you()
                            || service_err.err().is_bucket_already_exists()
                );
                if already_exists {
                    true
                } else {
                    tracing::error!(error = %e, bucket = %self.bucket, "failed to create bucket");
                    false
                }
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
        let size = data.len() as u64;
        let body = ByteStream::from(Bytes::from(data));

        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type(&resolved_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(key)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let start = std::time::Instant::now();

        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) {
                        return Ok(None);
                    }
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                return Err(StorageError::DownloadFailed(e.to_string()));
            }
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let bytes = data.into_bytes().to_vec();

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(Some(bytes))
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let start = std::time::Instant::now();

        // DeleteObject succeeds on absent keys, so existence is checked
        // first to report whether anything was removed.
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {}
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if matches!(service_err.err(), HeadObjectError::NotFound(_)) {
                        return Ok(false);
                    }
                }
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(true)
    }

    async fn presign(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if expires_in.is_zero() {
            return Err(StorageError::InvalidExpiry(
                "expiry must be positive".to_string(),
            ));
        }

        let presigning_config = aws_sdk_s3::presigning::PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(presigned_request.uri().to_string())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
