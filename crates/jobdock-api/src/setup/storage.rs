//! Storage setup and initialization

use std::sync::Arc;

use anyhow::Result;

use jobdock_core::Config;
use jobdock_storage::{create_storage, ObjectStorage};

/// Setup the object storage gateway and make sure its bucket exists.
///
/// A failed bucket check is logged but does not abort startup; the
/// backend may grant object-level access without bucket admin rights.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ObjectStorage>> {
    tracing::info!("Initializing storage gateway...");
    let storage = create_storage(config).await?;
    let backend_type = storage.backend_type();

    if !storage.ensure_bucket().await {
        tracing::warn!(
            backend = ?backend_type,
            "Could not verify or create the storage bucket; uploads may fail"
        );
    }

    tracing::info!(backend = ?backend_type, "Storage gateway initialized");
    Ok(storage)
}
