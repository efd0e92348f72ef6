//! Handlers for a job's stored file: bytes, presigned URL, and manifest.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use jobdock_core::{AppError, ArchiveEntry, ArchiveSummary};

use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;

#[derive(Debug, Deserialize, IntoParams)]
pub struct FileUrlParams {
    /// URL lifetime in seconds (default 3600, must be positive)
    pub expires: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ManifestResponse {
    pub entries: Vec<ArchiveEntry>,
    pub summary: ArchiveSummary,
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/file",
    tag = "jobs",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "The stored file", content_type = "application/octet-stream"),
        (status = 403, description = "Job belongs to another user", body = ErrorResponse),
        (status = 404, description = "Job or file not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, job_id = %id, operation = "get_job_file"))]
pub async fn get_job_file(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (data, content_type, file_name) = state.job_service.file_bytes(user.0, id).await?;

    let content_disposition = format!("attachment; filename=\"{}\"", file_name);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_str())
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/file/url",
    tag = "jobs",
    params(("id" = i64, Path, description = "Job ID"), FileUrlParams),
    responses(
        (status = 200, description = "Presigned URL for the stored file", body = FileUrlResponse),
        (status = 400, description = "Invalid expiry", body = ErrorResponse),
        (status = 404, description = "Job or file not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, job_id = %id, operation = "get_job_file_url"))]
pub async fn get_job_file_url(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(params): Query<FileUrlParams>,
) -> Result<Json<FileUrlResponse>, HttpAppError> {
    let expires = params.expires.unwrap_or(DEFAULT_URL_EXPIRY_SECS);
    let url = state
        .job_service
        .file_url(user.0, id, Duration::from_secs(expires))
        .await?;
    Ok(Json(FileUrlResponse {
        url,
        expires_in: expires,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/manifest",
    tag = "jobs",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Archive manifest with aggregate summary", body = ManifestResponse),
        (status = 400, description = "Job file is not an archive", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Stored manifest is corrupted", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, job_id = %id, operation = "get_job_manifest"))]
pub async fn get_job_manifest(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ManifestResponse>, HttpAppError> {
    let (entries, summary) = state.job_service.manifest(user.0, id).await?;
    Ok(Json(ManifestResponse { entries, summary }))
}
