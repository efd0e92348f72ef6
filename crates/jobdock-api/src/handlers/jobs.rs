//! Job CRUD handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use jobdock_core::{AppError, JobResponse, JobStatus};
use jobdock_db::JobUpdate;

use crate::auth::CurrentUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::NewJobUpload;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Rows to skip (default 0)
    pub skip: Option<i64>,
    /// Maximum rows to return (default 100, capped at 500)
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<JobStatus>,
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    tag = "jobs",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Upload rejected by validation", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = user.0, operation = "create_job"))]
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut upload: Option<NewJobUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid title field: {}", e)))?;
                if !text.is_empty() {
                    title = Some(text);
                }
            }
            Some("description") => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Invalid description field: {}", e))
                })?;
                if !text.is_empty() {
                    description = Some(text);
                }
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid file field: {}", e)))?
                    .to_vec();
                upload = Some(NewJobUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let job = state
        .job_service
        .create(user.0, title, description, upload)
        .await?;

    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    tag = "jobs",
    params(ListParams),
    responses(
        (status = 200, description = "The caller's jobs, newest first", body = [JobResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, operation = "list_jobs"))]
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<JobResponse>>, HttpAppError> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let jobs = state.job_service.list(user.0, skip, limit).await?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "The job", body = JobResponse),
        (status = 403, description = "Job belongs to another user", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, job_id = %id, operation = "get_job"))]
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<JobResponse>, HttpAppError> {
    let job = state.job_service.get(user.0, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/uuid/{uuid}",
    tag = "jobs",
    params(("uuid" = Uuid, Path, description = "Job UUID")),
    responses(
        (status = 200, description = "The job", body = JobResponse),
        (status = 403, description = "Job belongs to another user", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, job_uuid = %uuid, operation = "get_job_by_uuid"))]
pub async fn get_job_by_uuid(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(uuid): Path<Uuid>,
) -> Result<Json<JobResponse>, HttpAppError> {
    let job = state.job_service.get_by_uuid(user.0, uuid).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = i64, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Updated job", body = JobResponse),
        (status = 403, description = "Job belongs to another user", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(user_id = user.0, job_id = %id, operation = "update_job"))]
pub async fn update_job(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateJobRequest>,
) -> Result<Json<JobResponse>, HttpAppError> {
    let update = JobUpdate {
        title: body.title,
        description: body.description,
        status: body.status,
    };
    let job = state.job_service.update(user.0, id, update).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 403, description = "Job belongs to another user", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = user.0, job_id = %id, operation = "delete_job"))]
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpAppError> {
    state.job_service.delete(user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
