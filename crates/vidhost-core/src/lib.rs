//! vidhost Core Library
//!
//! This crate provides the domain models, error types, and configuration shared
//! by every vidhost component.

pub mod backend_types;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use backend_types::{CatalogBackend, NormalizationMode, UrlStyle};
pub use config::{BaseConfig, CatalogConfig, Config, MediaConfig, ObjectStoreConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
