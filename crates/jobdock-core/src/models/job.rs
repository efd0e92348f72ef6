use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::archive::ArchiveEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Whether the stored file was kept as-is or went through archive
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "file_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Single,
    Archive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
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
    /// Raw manifest JSON as persisted; parse through `manifest()`.
    pub archive_manifest: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn has_file(&self) -> bool {
        self.file_key.is_some()
    }

    /// Parse the persisted manifest column. `Ok(None)` when no manifest is
    /// stored; a column that fails to deserialize is a `MalformedManifest`.
    pub fn manifest(&self) -> Result<Option<Vec<ArchiveEntry>>, AppError> {
        match &self.archive_manifest {
            None => Ok(None),
            Some(raw) => serde_json::from_str::<Vec<ArchiveEntry>>(raw)
                .map(Some)
                .map_err(|e| AppError::MalformedManifest(e.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: i64,
    pub uuid: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_content_type: Option<String>,
    pub file_kind: FileKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        JobResponse {
            id: job.id,
            uuid: job.uuid,
            title: job.title,
            description: job.description,
            status: job.status,
            file_name: job.file_name,
            file_size: job.file_size,
            file_content_type: job.file_content_type,
            file_kind: job.file_kind,
            created_at: job.created_at,
            updated_at: job.updated_at,
            completed_at: job.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_job() -> Job {
        Job {
            id: 1,
            uuid: Uuid::new_v4(),
            title: Some("report.pdf".to_string()),
            description: None,
            status: JobStatus::Pending,
            file_key: Some("jobs/abc.pdf".to_string()),
            file_name: Some("report.pdf".to_string()),
            file_size: Some(2048),
            file_content_type: Some("application/pdf".to_string()),
            file_kind: FileKind::Single,
            archive_manifest: None,
            owner_id: 42,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_job_response_from_job() {
        let job = test_job();
        let uuid = job.uuid;
        let response = JobResponse::from(job);
        assert_eq!(response.id, 1);
        assert_eq!(response.uuid, uuid);
        assert_eq!(response.file_name.as_deref(), Some("report.pdf"));
        assert_eq!(response.file_kind, FileKind::Single);
        assert_eq!(response.completed_at, None);
    }

    #[test]
    fn test_manifest_absent() {
        let job = test_job();
        assert!(job.manifest().unwrap().is_none());
    }

    #[test]
    fn test_manifest_parses_stored_json() {
        let mut job = test_job();
        job.file_kind = FileKind::Archive;
        job.archive_manifest = Some(
            r#"[{"path":"a.txt","size":10,"compressed_size":5,"compression_ratio":50.0,"modified":null,"encrypted":false,"content_type":"text/plain"}]"#
                .to_string(),
        );
        let manifest = job.manifest().unwrap().unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest[0].path, "a.txt");
    }

    #[test]
    fn test_manifest_corruption_is_malformed_manifest() {
        let mut job = test_job();
        job.archive_manifest = Some("{not json".to_string());
        match job.manifest() {
            Err(AppError::MalformedManifest(_)) => {}
            other => panic!("expected MalformedManifest, got {:?}", other.err()),
        }
    }
}
