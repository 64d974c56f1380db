//! Configuration validation
//!
//! Runs at startup, before any connection is opened, so misconfiguration
//! fails fast with a readable message.

use anyhow::Result;
use vidhost_core::{CatalogBackend, Config, UrlStyle};

/// Validate configuration beyond what parsing already checked.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();
    if config.is_production() && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if config.catalog.backend == CatalogBackend::Blob {
        tracing::warn!(
            "Flat-file catalog rewrites the whole videos document on every upload; concurrent uploads can lose records"
        );
    }

    if config.media.url_style == UrlStyle::Proxy && config.object_store.public_url.is_some() {
        tracing::debug!("S3_PUBLIC_URL is set but media is served through the proxy routes");
    }

    if config.base.request_timeout_secs == 0 {
        return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
    }

    Ok(())
}
