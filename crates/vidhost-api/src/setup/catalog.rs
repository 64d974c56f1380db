//! Catalog setup

use anyhow::{Context, Result};
use std::sync::Arc;
use vidhost_core::Config;
use vidhost_db::{create_catalog, Catalog};
use vidhost_storage::BlobStore;

/// Connect the configured catalog and prepare its schema. Any failure here
/// is fatal.
pub async fn setup_catalog(
    config: &Config,
    blob_store: Arc<dyn BlobStore>,
) -> Result<Arc<dyn Catalog>> {
    let catalog = create_catalog(&config.catalog, blob_store)
        .await
        .context("Failed to create catalog")?;

    catalog
        .ensure_schema_ready()
        .await
        .context("Failed to prepare catalog schema")?;

    catalog
        .ping()
        .await
        .context("Catalog is not reachable")?;

    tracing::info!(backend = %catalog.backend(), "Catalog ready");
    Ok(catalog)
}
