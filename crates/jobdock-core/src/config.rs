//! Configuration module
//!
//! Environment-driven configuration for the API service, covering the
//! database, storage backend selection, authentication, and archive limits.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DB_CONNECT_RETRIES: u32 = 30;
const DB_CONNECT_RETRY_DELAY_SECS: u64 = 1;
const MAX_ARCHIVE_SIZE_MB: u64 = 100;
const MAX_ARCHIVE_ENTRIES: usize = 1000;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub db_connect_retries: u32,
    pub db_connect_retry_delay_secs: u64,
    pub jwt_secret: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Archive safety limits
    pub archive_max_bytes: u64,
    pub archive_max_entries: usize,
    /// Request body cap for uploads; sits above the archive ceiling so the
    /// archive gate produces the user-facing rejection for zips.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend =
            env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| match s.to_lowercase().as_str() {
                    "s3" => Some(StorageBackend::S3),
                    "local" => Some(StorageBackend::Local),
                    _ => None,
                });

        let archive_max_bytes = env::var("MAX_ARCHIVE_SIZE_MB")
            .unwrap_or_else(|_| MAX_ARCHIVE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_ARCHIVE_SIZE_MB)
            * 1024
            * 1024;

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            db_connect_retries: env::var("DB_CONNECT_RETRIES")
                .unwrap_or_else(|_| DB_CONNECT_RETRIES.to_string())
                .parse()
                .unwrap_or(DB_CONNECT_RETRIES),
            db_connect_retry_delay_secs: env::var("DB_CONNECT_RETRY_DELAY_SECS")
                .unwrap_or_else(|_| DB_CONNECT_RETRY_DELAY_SECS.to_string())
                .parse()
                .unwrap_or(DB_CONNECT_RETRY_DELAY_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            archive_max_bytes,
            archive_max_entries: env::var("MAX_ARCHIVE_ENTRIES")
                .unwrap_or_else(|_| MAX_ARCHIVE_ENTRIES.to_string())
                .parse()
                .unwrap_or(MAX_ARCHIVE_ENTRIES),
            max_upload_bytes: env::var("MAX_UPLOAD_SIZE_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(archive_max_bytes as usize + 1024 * 1024),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.archive_max_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_ARCHIVE_SIZE_MB must be greater than 0"));
        }

        if self.archive_max_entries == 0 {
            return Err(anyhow::anyhow!("MAX_ARCHIVE_ENTRIES must be greater than 0"));
        }

        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
