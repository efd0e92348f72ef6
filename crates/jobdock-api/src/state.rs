//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use jobdock_archive::ArchiveLimits;
use jobdock_core::Config;
use jobdock_db::JobRepository;
use jobdock_storage::ObjectStorage;

use crate::services::JobService;

/// Application state shared across handlers. The storage gateway is
/// constructed once at startup and injected here; nothing reaches for a
/// global client.
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub jobs: JobRepository,
    pub storage: Arc<dyn ObjectStorage>,
    pub job_service: JobService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        let jobs = JobRepository::new(pool.clone());
        let limits = ArchiveLimits {
            max_bytes: config.archive_max_bytes,
            max_entries: config.archive_max_entries,
        };
        let job_service = JobService::new(jobs.clone(), storage.clone(), limits);
        AppState {
            config,
            pool,
            jobs,
            storage,
            job_service,
        }
    }
}
