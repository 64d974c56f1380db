//! Error types module
//!
//! This module provides the core error type used throughout vidhost. Every
//! failure that can reach an HTTP client is an `AppError` variant; crate-local
//! errors (storage, transcode, catalog) are converted into it at the API
//! boundary.
//!
//! Pipeline failures (`ThumbnailDerivationFailed`, `VideoNormalizationFailed`,
//! `UploadFailed`, `CatalogWriteFailed`) are sensitive: their detail is logged
//! server-side and the client only sees a generic message.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Generic message returned for every ingestion pipeline failure.
pub const PIPELINE_FAILURE_MESSAGE: &str = "Failed to process upload";

/// Message returned for every failed login, whatever the cause.
pub const AUTH_FAILED_MESSAGE: &str = "Invalid username or password";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Thumbnail derivation failed: {0}")]
    ThumbnailDerivationFailed(String),

    #[error("Video normalization failed: {0}")]
    VideoNormalizationFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Catalog write failed: {0}")]
    CatalogWriteFailed(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Catalog(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MissingInput(_) => (400, "MISSING_INPUT", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::ThumbnailDerivationFailed(_) => {
            (500, "THUMBNAIL_DERIVATION_FAILED", true, LogLevel::Error)
        }
        AppError::VideoNormalizationFailed(_) => {
            (500, "VIDEO_NORMALIZATION_FAILED", true, LogLevel::Error)
        }
        AppError::UploadFailed(_) => (500, "UPLOAD_FAILED", true, LogLevel::Error),
        AppError::CatalogWriteFailed(_) => (500, "CATALOG_WRITE_FAILED", true, LogLevel::Error),
        AppError::Catalog(_) => (500, "CATALOG_ERROR", true, LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::AuthFailed => (401, "AUTH_FAILED", false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingInput(_) => "MissingInput",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::ThumbnailDerivationFailed(_) => "ThumbnailDerivationFailed",
            AppError::VideoNormalizationFailed(_) => "VideoNormalizationFailed",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::CatalogWriteFailed(_) => "CatalogWriteFailed",
            AppError::Catalog(_) => "Catalog",
            AppError::Storage(_) => "Storage",
            AppError::NotFound(_) => "NotFound",
            AppError::AuthFailed => "AuthFailed",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingInput(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::ThumbnailDerivationFailed(_)
            | AppError::VideoNormalizationFailed(_)
            | AppError::UploadFailed(_)
            | AppError::CatalogWriteFailed(_) => PIPELINE_FAILURE_MESSAGE.to_string(),
            AppError::Catalog(_) => "Failed to access catalog".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::AuthFailed => AUTH_FAILED_MESSAGE.to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
