//! Blob store setup

use anyhow::Result;
use std::sync::Arc;
use vidhost_core::Config;
use vidhost_storage::{create_blob_store, BlobStore};

pub async fn setup_blob_store(config: &Config) -> Result<Arc<dyn BlobStore>> {
    tracing::info!(
        bucket = %config.object_store.bucket,
        region = %config.object_store.region,
        "Initializing blob store..."
    );
    let store = create_blob_store(&config.object_store)?;
    tracing::info!(
        backend = store.backend_name(),
        "Blob store initialized successfully"
    );
    Ok(store)
}
