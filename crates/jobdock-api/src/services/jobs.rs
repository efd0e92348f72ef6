//! Job lifecycle service.
//!
//! Owns the ingestion pipeline (create row, classify, validate, upload,
//! attach file fields) and the owner-checked read, update, and delete
//! operations. Failure after the row exists compensates by deleting
//! whatever was already persisted, so a rejected or failed upload leaves
//! neither a row nor an orphaned object behind.

use std::sync::Arc;
use std::time::Duration;

use jobdock_archive::{inspect, ArchiveCheck, ArchiveLimits};
use jobdock_core::{AppError, ArchiveEntry, ArchiveSummary, FileKind, Job};
use jobdock_db::{JobFileInfo, JobRepository, JobUpdate};
use jobdock_storage::{resolve_content_type, ObjectStorage};
use uuid::Uuid;

/// An uploaded file accompanying job creation.
pub struct NewJobUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct JobService {
    jobs: JobRepository,
    storage: Arc<dyn ObjectStorage>,
    limits: ArchiveLimits,
}

impl JobService {
    pub fn new(jobs: JobRepository, storage: Arc<dyn ObjectStorage>, limits: ArchiveLimits) -> Self {
        JobService {
            jobs,
            storage,
            limits,
        }
    }

    /// Create a job, optionally ingesting an uploaded file.
    ///
    /// The row is created first so a job id exists for the whole pipeline;
    /// any failure past that point removes the row again before the error
    /// is returned.
    pub async fn create(
        &self,
        owner_id: i64,
        title: Option<String>,
        description: Option<String>,
        upload: Option<NewJobUpload>,
    ) -> Result<Job, AppError> {
        // An untitled job with a file takes the filename as its title.
        let title = title.or_else(|| upload.as_ref().map(|u| u.filename.clone()));

        let job = self.jobs.create(owner_id, title, description).await?;

        let Some(upload) = upload else {
            return Ok(job);
        };

        match self.attach_file(&job, upload).await {
            Ok(updated) => Ok(updated),
            Err(err) => {
                // Compensate: the job must not survive a failed ingestion.
                // The original error is preserved either way.
                if let Err(cleanup_err) = self.jobs.delete(job.id).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        job_id = job.id,
                        "failed to remove job row after failed ingestion"
                    );
                }
                Err(err)
            }
        }
    }

    async fn attach_file(&self, job: &Job, upload: NewJobUpload) -> Result<Job, AppError> {
        let (file_kind, manifest) = match inspect(&upload.data, &upload.filename, &self.limits) {
            ArchiveCheck::NotAnArchive => (FileKind::Single, None),
            ArchiveCheck::Rejected(rejection) => {
                return Err(AppError::ValidationRejected(rejection.to_string()));
            }
            ArchiveCheck::Valid(entries) => {
                let manifest = serde_json::to_string(&entries)
                    .map_err(|e| AppError::Internal(format!("manifest encoding failed: {}", e)))?;
                (FileKind::Archive, Some(manifest))
            }
        };

        let file_size = upload.data.len() as i64;
        let content_type = resolve_content_type(upload.content_type.as_deref(), &upload.filename);

        let key = self
            .storage
            .put(upload.data, &upload.filename, upload.content_type.as_deref())
            .await?;

        let info = JobFileInfo {
            file_key: key.clone(),
            file_name: upload.filename,
            file_size,
            file_content_type: content_type,
            file_kind,
            archive_manifest: manifest,
        };

        match self.jobs.set_file_info(job.id, info).await {
            Ok(Some(updated)) => {
                tracing::info!(
                    job_id = updated.id,
                    key = %key,
                    size_bytes = file_size,
                    kind = ?file_kind,
                    "file attached to job"
                );
                Ok(updated)
            }
            Ok(None) => {
                self.remove_object_best_effort(&key).await;
                Err(AppError::NotFound("Job not found".to_string()))
            }
            Err(err) => {
                // The object is already stored; remove it so the failed
                // write does not leak storage.
                self.remove_object_best_effort(&key).await;
                Err(err)
            }
        }
    }

    async fn remove_object_best_effort(&self, key: &str) {
        if let Err(err) = self.storage.delete(key).await {
            tracing::warn!(error = %err, key = %key, "failed to remove stored object during cleanup");
        }
    }

    /// Load a job and enforce ownership: absent rows are `NotFound`,
    /// someone else's rows are `Forbidden`.
    async fn load_owned(&self, owner_id: i64, id: i64) -> Result<Job, AppError> {
        let job = self
            .jobs
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Not authorized to access this job".to_string(),
            ));
        }
        Ok(job)
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> Result<Job, AppError> {
        self.load_owned(owner_id, id).await
    }

    /// Look up a job by its external identifier, with the same ownership
    /// rules as the row-id read.
    pub async fn get_by_uuid(&self, owner_id: i64, uuid: Uuid) -> Result<Job, AppError> {
        let job = self
            .jobs
            .get_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.owner_id != owner_id {
            return Err(AppError::Forbidden(
                "Not authorized to access this job".to_string(),
            ));
        }
        Ok(job)
    }

    pub async fn list(&self, owner_id: i64, skip: i64, limit: i64) -> Result<Vec<Job>, AppError> {
        self.jobs.list_by_owner(owner_id, skip, limit).await
    }

    pub async fn update(&self, owner_id: i64, id: i64, update: JobUpdate) -> Result<Job, AppError> {
        self.load_owned(owner_id, id).await?;
        self.jobs
            .update_fields(id, update)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    /// Delete a job and its stored object. The object goes first; a
    /// storage failure is logged but never blocks removal of the row.
    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), AppError> {
        let job = self.load_owned(owner_id, id).await?;

        if let Some(key) = &job.file_key {
            match self.storage.delete(key).await {
                Ok(removed) => {
                    tracing::debug!(job_id = job.id, key = %key, removed, "stored object deleted");
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        job_id = job.id,
                        key = %key,
                        "failed to delete stored object; removing job row anyway"
                    );
                }
            }
        }

        self.jobs.delete(job.id).await?;
        Ok(())
    }

    /// Fetch the stored file: (bytes, content type, filename).
    pub async fn file_bytes(
        &self,
        owner_id: i64,
        id: i64,
    ) -> Result<(Vec<u8>, String, String), AppError> {
        let job = self.load_owned(owner_id, id).await?;
        let key = job
            .file_key
            .as_deref()
            .ok_or_else(|| AppError::NotFound("Job has no file".to_string()))?;

        let data = self
            .storage
            .get(key)
            .await?
            .ok_or_else(|| AppError::NotFound("Stored file is missing".to_string()))?;

        let file_name = job
            .file_name
            .clone()
            .unwrap_or_else(|| "download".to_string());
        // Stored rows can predate content-type capture; fall back to the
        // filename extension on the way out.
        let content_type = match job.file_content_type {
            Some(ct) if !ct.trim().is_empty() => ct,
            _ => resolve_content_type(None, &file_name),
        };

        Ok((data, content_type, file_name))
    }

    /// Generate a presigned URL for the stored file.
    pub async fn file_url(
        &self,
        owner_id: i64,
        id: i64,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        let job = self.load_owned(owner_id, id).await?;
        let key = job
            .file_key
            .as_deref()
            .ok_or_else(|| AppError::NotFound("Job has no file".to_string()))?;
        Ok(self.storage.presign(key, expires_in).await?)
    }

    /// Parse the persisted manifest and derive its aggregate summary.
    pub async fn manifest(
        &self,
        owner_id: i64,
        id: i64,
    ) -> Result<(Vec<ArchiveEntry>, ArchiveSummary), AppError> {
        let job = self.load_owned(owner_id, id).await?;
        if job.file_kind != FileKind::Archive {
            return Err(AppError::InvalidInput(
                "Job file is not a zip archive".to_string(),
            ));
        }
        let entries = job.manifest()?.ok_or_else(|| {
            AppError::MalformedManifest("archive job has no stored manifest".to_string())
        })?;
        let summary = ArchiveSummary::from_entries(&entries);
        Ok((entries, summary))
    }
}
