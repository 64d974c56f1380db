//! Blob store abstraction trait
//!
//! This module defines the `BlobStore` trait that every object store backend
//! implements. Callers only deal in keys; how a key maps to a bucket, a path
//! or a URL is the backend's business.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked body of a stored object.
pub type BlobStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// A stored object opened for reading.
///
/// The body is a stream; nothing is buffered until the caller polls it.
pub struct BlobObject {
    pub stream: BlobStream,
    pub content_type: String,
    pub size: u64,
}

impl BlobObject {
    /// Drain the stream into one buffer. Only meant for small objects such as
    /// catalog documents.
    pub async fn bytes(mut self) -> StorageResult<Bytes> {
        let mut buf = BytesMut::with_capacity(self.size as usize);
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for BlobObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobObject")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Blob store abstraction
///
/// `put` overwrites and never retries. `get` returns `StorageError::NotFound`
/// for an absent key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Open an object for streaming.
    async fn get(&self, key: &str) -> StorageResult<BlobObject>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Public URL for `key`, if the store is configured with a public base URL.
    fn url_for(&self, key: &str) -> Option<String>;

    /// Short backend name used in logs and health output.
    fn backend_name(&self) -> &'static str;
}
