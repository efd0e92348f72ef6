//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jobdock API",
        version = "0.1.0",
        description = "Job management API with file ingestion and archive inspection. Uploaded zip archives are validated against size, entry count, compression ratio, path safety, and encryption limits before their manifest is recorded. All endpoints are versioned under /api/v1/."
    ),
    paths(
        handlers::health::health,
        // Jobs
        handlers::jobs::create_job,
        handlers::jobs::list_jobs,
        handlers::jobs::get_job,
        handlers::jobs::get_job_by_uuid,
        handlers::jobs::update_job,
        handlers::jobs::delete_job,
        // Job files
        handlers::job_file::get_job_file,
        handlers::job_file::get_job_file_url,
        handlers::job_file::get_job_manifest,
    ),
    components(
        schemas(
            jobdock_core::JobResponse,
            jobdock_core::JobStatus,
            jobdock_core::FileKind,
            jobdock_core::ArchiveEntry,
            jobdock_core::ArchiveSummary,
            handlers::health::HealthResponse,
            handlers::jobs::UpdateJobRequest,
            handlers::job_file::FileUrlResponse,
            handlers::job_file::ManifestResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "jobs", description = "Job lifecycle, file ingestion, and archive manifest operations"),
        (name = "health", description = "Service health checks")
    )
)]
pub struct ApiDoc;
