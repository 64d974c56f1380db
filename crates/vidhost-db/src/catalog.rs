//! Catalog abstraction
//!
//! The catalog maps each ingested video to its title, creator and media
//! locators, and resolves user credentials. Backends are interchangeable;
//! one is chosen at startup by `create_catalog`.

use async_trait::async_trait;
use thiserror::Error;
use vidhost_core::models::{NewVideo, UserRecord, VideoRecord};
use vidhost_core::CatalogBackend;
use vidhost_storage::StorageError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog configuration error: {0}")]
    Config(String),

    #[error("Catalog connection failed: {0}")]
    Connection(String),

    #[error("Catalog query failed: {0}")]
    Query(String),

    #[error("Catalog data is corrupt: {0}")]
    Corrupt(String),

    #[error("Catalog backend not available: {0}")]
    Unavailable(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(feature = "catalog-postgres")]
impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                CatalogError::Connection(err.to_string())
            }
            other => CatalogError::Query(other.to_string()),
        }
    }
}

#[cfg(feature = "catalog-mongo")]
impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Query(err.to_string())
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        CatalogError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Corrupt(err.to_string())
    }
}

/// Catalog store
///
/// Listings are newest first; records with equal `uploaded_at` come back
/// latest-inserted first.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Idempotent setup, run once at startup.
    async fn ensure_schema_ready(&self) -> CatalogResult<()>;

    /// Insert a record. Either the whole record is stored or nothing is.
    async fn insert_video(&self, video: NewVideo) -> CatalogResult<VideoRecord>;

    async fn list_videos(&self) -> CatalogResult<Vec<VideoRecord>>;

    /// Records whose creator equals `creator` exactly.
    async fn list_videos_by_creator(&self, creator: &str) -> CatalogResult<Vec<VideoRecord>>;

    /// The user whose username and password both match exactly.
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> CatalogResult<Option<UserRecord>>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> CatalogResult<()>;

    /// Release connections. The catalog is unusable afterwards.
    async fn close(&self) {}

    fn backend(&self) -> CatalogBackend;
}

/// Order records newest first, breaking `uploaded_at` ties by reverse
/// insertion order. `records` must be in insertion order.
#[cfg_attr(not(feature = "catalog-blob"), allow(dead_code))]
pub(crate) fn newest_first(mut records: Vec<VideoRecord>) -> Vec<VideoRecord> {
    records.reverse();
    records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    records
}
