//! Application setup and initialization
//!
//! Initialization logic extracted from main.rs so each stage (telemetry,
//! database, storage, routes) can be exercised independently.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Result;
use jobdock_core::Config;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    telemetry::init_telemetry(&config);

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let storage = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(config, pool, storage));

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
