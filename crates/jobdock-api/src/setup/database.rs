//! Database setup and initialization

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use jobdock_core::Config;

/// Setup database connection pool and run migrations
///
/// Connection attempts are retried a bounded number of times so the
/// service survives the database coming up slightly later (compose,
/// Kubernetes rollouts).
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");

    let mut attempt: u32 = 0;
    let pool = loop {
        attempt += 1;
        let result = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => break pool,
            Err(err) if attempt < config.db_connect_retries => {
                tracing::warn!(
                    error = %err,
                    attempt,
                    max_attempts = config.db_connect_retries,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(Duration::from_secs(config.db_connect_retry_delay_secs)).await;
            }
            Err(err) => {
                return Err(err).context("Failed to connect to database");
            }
        }
    };

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected successfully"
    );

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
