use crate::object::ObjectBlobStore;
use crate::{BlobStore, StorageError, StorageResult};
use std::sync::Arc;
use vidhost_core::ObjectStoreConfig;

/// Create the blob store described by configuration
#[cfg(feature = "storage-s3")]
pub fn create_blob_store(config: &ObjectStoreConfig) -> StorageResult<Arc<dyn BlobStore>> {
    let endpoint = config.endpoint_url().ok_or_else(|| {
        StorageError::ConfigError("S3_ENDPOINT or S3_ACCOUNT_ID not configured".to_string())
    })?;

    let store = ObjectBlobStore::s3(
        config.bucket.clone(),
        config.region.clone(),
        endpoint,
        config.access_key_id.clone(),
        config.secret_access_key.clone(),
        config.public_url.clone(),
    )?;

    tracing::info!(
        bucket = %config.bucket,
        region = %config.region,
        public_url = ?config.public_url,
        "Blob store configured"
    );

    Ok(Arc::new(store))
}

#[cfg(not(feature = "storage-s3"))]
pub fn create_blob_store(_config: &ObjectStoreConfig) -> StorageResult<Arc<dyn BlobStore>> {
    Err(StorageError::ConfigError(
        "S3 blob store not available (storage-s3 feature not enabled)".to_string(),
    ))
}
