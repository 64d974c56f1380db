//! Application setup and initialization
//!
//! Builds every process-scoped handle (blob store, catalog, media processors)
//! once and hands them to the router through `AppState`.

pub mod catalog;
pub mod media;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidhost_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config.base.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.base.environment,
        catalog = %config.catalog.backend,
        "Configuration loaded and validated successfully"
    );

    let blob_store = storage::setup_blob_store(&config).await?;
    let catalog = catalog::setup_catalog(&config, blob_store.clone()).await?;
    let media = media::setup_media(&config).await?;

    let state = services::build_state(&config, catalog, blob_store, media);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
