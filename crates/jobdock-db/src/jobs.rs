//! Job repository: CRUD for the jobs table.

use chrono::{DateTime, Utc};
use jobdock_core::{AppError, FileKind, Job, JobStatus};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const JOB_COLUMNS: &str = "id, uuid, title, description, status, file_key, file_name, file_size, \
     file_content_type, file_kind, archive_manifest, owner_id, created_at, updated_at, completed_at";

/// Row type for the jobs table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct JobRow {
    pub id: i64,
    pub uuid: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: JobStatus,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_content_type: Option<String>,
    pub file_kind: FileKind,
    pub archive_manifest: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobRow {
    pub fn to_job(self) -> Job {
        Job {
            id: self.id,
            uuid: self.uuid,
            title: self.title,
            description: self.description,
            status: self.status,
            file_key: self.file_key,
            file_name: self.file_name,
            file_size: self.file_size,
            file_content_type: self.file_content_type,
            file_kind: self.file_kind,
            archive_manifest: self.archive_manifest,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        }
    }
}

/// Partial update of a job's mutable fields. `None` leaves a field
/// unchanged.
#[derive(Debug, Default, Clone)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<JobStatus>,
}

/// File attachment fields, written in a single statement after a
/// successful upload.
#[derive(Debug, Clone)]
pub struct JobFileInfo {
    pub file_key: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_content_type: String,
    pub file_kind: FileKind,
    pub archive_manifest: Option<String>,
}

/// Repository for the jobs table.
#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new job row in pending state and return it.
    #[tracing::instrument(skip(self), fields(db.table = "jobs"))]
    pub async fn create(
        &self,
        owner_id: i64,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Job, AppError> {
        let row: JobRow = sqlx::query_as::<Postgres, JobRow>(&format!(
            "INSERT INTO jobs (uuid, title, description, owner_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&title)
        .bind(&description)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.to_job())
    }

    /// Fetch a job by id.
    #[tracing::instrument(skip(self), fields(db.table = "jobs", db.record_id = %id))]
    pub async fn get(&self, id: i64) -> Result<Option<Job>, AppError> {
        let row: Option<JobRow> = sqlx::query_as::<Postgres, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.to_job()))
    }

    /// Fetch a job by its external uuid.
    #[tracing::instrument(skip(self), fields(db.table = "jobs", db.record_uuid = %uuid))]
    pub async fn get_by_uuid(&self, uuid: Uuid) -> Result<Option<Job>, AppError> {
        let row: Option<JobRow> = sqlx::query_as::<Postgres, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE uuid = $1"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.to_job()))
    }

    /// List an owner's jobs, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "jobs", owner_id = owner_id))]
    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Job>, AppError> {
        let rows: Vec<JobRow> = sqlx::query_as::<Postgres, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC \
             OFFSET $2 LIMIT $3"
        ))
        .bind(owner_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.to_job()).collect())
    }

    /// Apply a partial update. Setting status to completed stamps
    /// `completed_at`.
    #[tracing::instrument(skip(self, update), fields(db.table = "jobs", db.record_id = %id))]
    pub async fn update_fields(
        &self,
        id: i64,
        update: JobUpdate,
    ) -> Result<Option<Job>, AppError> {
        let row: Option<JobRow> = sqlx::query_as::<Postgres, JobRow>(&format!(
            "UPDATE jobs SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 status = COALESCE($4, status), \
                 completed_at = CASE \
                     WHEN $4 = 'completed'::job_status THEN now() \
                     ELSE completed_at \
                 END, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.to_job()))
    }

    /// Write all file attachment fields in one statement.
    #[tracing::instrument(skip(self, info), fields(db.table = "jobs", db.record_id = %id, key = %info.file_key))]
    pub async fn set_file_info(
        &self,
        id: i64,
        info: JobFileInfo,
    ) -> Result<Option<Job>, AppError> {
        let row: Option<JobRow> = sqlx::query_as::<Postgres, JobRow>(&format!(
            "UPDATE jobs SET \
                 file_key = $2, \
                 file_name = $3, \
                 file_size = $4, \
                 file_content_type = $5, \
                 file_kind = $6, \
                 archive_manifest = $7, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(&info.file_key)
        .bind(&info.file_name)
        .bind(info.file_size)
        .bind(&info.file_content_type)
        .bind(info.file_kind)
        .bind(&info.archive_manifest)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.to_job()))
    }

    /// Delete a job row. Returns whether a row was removed.
    #[tracing::instrument(skip(self), fields(db.table = "jobs", db.record_id = %id))]
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let deleted: Option<(i64,)> =
            sqlx::query_as::<Postgres, (i64,)>("DELETE FROM jobs WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(deleted.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_job_preserves_fields() {
        let uuid = Uuid::new_v4();
        let now = Utc::now();
        let row = JobRow {
            id: 7,
            uuid,
            title: Some("nightly export".to_string()),
            description: None,
            status: JobStatus::Processing,
            file_key: Some("jobs/abc.zip".to_string()),
            file_name: Some("export.zip".to_string()),
            file_size: Some(1024),
            file_content_type: Some("application/zip".to_string()),
            file_kind: FileKind::Archive,
            archive_manifest: Some("[]".to_string()),
            owner_id: 3,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let job = row.to_job();
        assert_eq!(job.id, 7);
        assert_eq!(job.uuid, uuid);
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.file_kind, FileKind::Archive);
        assert_eq!(job.owner_id, 3);
        assert!(job.has_file());
    }
}
