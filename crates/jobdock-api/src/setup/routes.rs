//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use jobdock_core::Config;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use crate::API_PREFIX;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state.config)?;

    // Server-level concurrency limit to protect against resource
    // exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .merge(job_routes())
        // Multipart bodies must fit the archive limit plus form overhead;
        // axum's 2 MiB default would reject most uploads.
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Job routes (all require a bearer token)
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/jobs", API_PREFIX),
            get(handlers::jobs::list_jobs).post(handlers::jobs::create_job),
        )
        .route(
            &format!("{}/jobs/{{id}}", API_PREFIX),
            get(handlers::jobs::get_job)
                .patch(handlers::jobs::update_job)
                .delete(handlers::jobs::delete_job),
        )
        .route(
            &format!("{}/jobs/uuid/{{uuid}}", API_PREFIX),
            get(handlers::jobs::get_job_by_uuid),
        )
        .route(
            &format!("{}/jobs/{{id}}/file", API_PREFIX),
            get(handlers::job_file::get_job_file),
        )
        .route(
            &format!("{}/jobs/{{id}}/file/url", API_PREFIX),
            get(handlers::job_file::get_job_file_url),
        )
        .route(
            &format!("{}/jobs/{{id}}/manifest", API_PREFIX),
            get(handlers::job_file::get_job_manifest),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    };
    Ok(cors)
}
