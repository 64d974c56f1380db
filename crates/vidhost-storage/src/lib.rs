//! vidhost Storage Library
//!
//! Blob storage for uploaded media: the `BlobStore` trait, an implementation
//! over `object_store` (S3-compatible services, or in-memory for tests), and
//! the key naming shared by every writer.
//!
//! # Key format
//!
//! - Thumbnails: `thumbnails/{millis}-{uuid}.png`
//! - Videos: `videos/{millis}-{uuid}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
pub mod object;
pub mod traits;

// Re-export commonly used types
pub use factory::create_blob_store;
pub use object::ObjectBlobStore;
pub use traits::{BlobObject, BlobStore, BlobStream, StorageError, StorageResult};
