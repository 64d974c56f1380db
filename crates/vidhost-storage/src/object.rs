use crate::keys::content_type_for_key;
use crate::traits::{BlobObject, BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
};
use std::sync::Arc;
use std::time::Instant;

/// `BlobStore` over any `object_store` backend.
///
/// Production uses `AmazonS3` pointed at an S3-compatible endpoint (R2,
/// MinIO, AWS); tests use `InMemory`.
#[derive(Clone)]
pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_url: Option<String>,
    backend: &'static str,
}

impl ObjectBlobStore {
    /// Create a store backed by an S3-compatible service.
    ///
    /// # Arguments
    /// * `endpoint` - Endpoint URL, e.g. `https://<account>.r2.cloudflarestorage.com`
    /// * `public_url` - Base URL under which stored keys are publicly readable
    #[cfg(feature = "storage-s3")]
    pub fn s3(
        bucket: String,
        region: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
        public_url: Option<String>,
    ) -> StorageResult<Self> {
        use object_store::aws::AmazonS3Builder;

        let allow_http = endpoint.starts_with("http://");
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket.clone())
            .with_region(region)
            .with_endpoint(endpoint)
            .with_allow_http(allow_http)
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key)
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self {
            store: Arc::new(store),
            bucket,
            public_url: public_url.map(|u| u.trim_end_matches('/').to_string()),
            backend: "s3",
        })
    }

    /// Create a process-local store. Contents vanish with the value.
    pub fn in_memory(public_url: Option<String>) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: "memory".to_string(),
            public_url: public_url.map(|u| u.trim_end_matches('/').to_string()),
            backend: "memory",
        }
    }

    fn location(key: &str) -> StorageResult<Path> {
        if key.is_empty() || key.starts_with('/') || key.split('/').any(|p| p == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(Path::from(key))
    }
}

fn attribute_str(value: &AttributeValue) -> &str {
    value
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let location = Self::location(key)?;
        let size = data.len() as u64;
        let start = Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(data), opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Blob put failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Blob put successful"
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<BlobObject> {
        let location = Self::location(key)?;
        let start = Instant::now();

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Blob get failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| attribute_str(v).to_string())
            .unwrap_or_else(|| content_type_for_key(key).to_string());
        let size = result.meta.size as u64;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            "Blob opened for streaming"
        );

        let bucket = self.bucket.clone();
        let key = key.to_string();
        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Blob stream error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(BlobObject {
            stream: Box::pin(stream),
            content_type,
            size,
        })
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Self::location(key)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Self::location(key)?;
        self.store.delete(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "Blob delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(bucket = %self.bucket, key = %key, "Blob deleted");
        Ok(())
    }

    fn url_for(&self, key: &str) -> Option<String> {
        self.public_url
            .as_ref()
            .map(|base| format!("{}/{}", base, key))
    }

    fn backend_name(&self) -> &'static str {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_returns_bytes_and_content_type() {
        let store = ObjectBlobStore::in_memory(None);
        store
            .put("thumbnails/a.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        let object = store.get("thumbnails/a.png").await.unwrap();
        assert_eq!(object.content_type, "image/png");
        assert_eq!(object.size, 9);
        assert_eq!(object.bytes().await.unwrap(), Bytes::from_static(b"png-bytes"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = ObjectBlobStore::in_memory(None);
        store
            .put("videos/a.mp4", Bytes::from_static(b"first"), "video/mp4")
            .await
            .unwrap();
        store
            .put("videos/a.mp4", Bytes::from_static(b"second"), "video/mp4")
            .await
            .unwrap();

        let object = store.get("videos/a.mp4").await.unwrap();
        assert_eq!(object.bytes().await.unwrap(), Bytes::from_static(b"second"));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let store = ObjectBlobStore::in_memory(None);
        let err = store.get("videos/missing.mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(!store.exists("videos/missing.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let store = ObjectBlobStore::in_memory(None);
        store
            .put("videos/a.mp4", Bytes::from_static(b"x"), "video/mp4")
            .await
            .unwrap();
        assert!(store.exists("videos/a.mp4").await.unwrap());
        store.delete("videos/a.mp4").await.unwrap();
        assert!(!store.exists("videos/a.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let store = ObjectBlobStore::in_memory(None);
        let err = store
            .put("../etc/passwd", Bytes::from_static(b"x"), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[test]
    fn test_url_for_uses_public_base() {
        let store = ObjectBlobStore::in_memory(Some("https://cdn.example.com/".to_string()));
        assert_eq!(
            store.url_for("videos/a.mp4").as_deref(),
            Some("https://cdn.example.com/videos/a.mp4")
        );
        assert_eq!(ObjectBlobStore::in_memory(None).url_for("videos/a.mp4"), None);
    }
}
