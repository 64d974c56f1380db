//! Fixed response texts and header values.

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Video uploaded successfully";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

pub const CROSS_ORIGIN_RESOURCE_POLICY: &str = "cross-origin";

/// Stored media never changes under a key.
pub const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Upper bound on in-flight requests; override with `HTTP_CONCURRENCY_LIMIT`.
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Room in the request body limit for the thumbnail and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 16 * 1024 * 1024;
