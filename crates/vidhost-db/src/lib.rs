//! vidhost Catalog Library
//!
//! The `Catalog` trait and its backends:
//!
//! - `PostgresCatalog` (feature `catalog-postgres`): `videos` and `users`
//!   tables, created by the embedded migrations in `migrations/`
//! - `MongoCatalog` (feature `catalog-mongo`): `videos` and `users`
//!   collections with camelCase fields
//! - `BlobCatalog` (feature `catalog-blob`): JSON arrays kept in the blob store

pub mod catalog;
pub mod factory;

#[cfg(feature = "catalog-blob")]
pub mod blob;
#[cfg(feature = "catalog-mongo")]
pub mod mongo;
#[cfg(feature = "catalog-postgres")]
pub mod postgres;

// Re-export commonly used types
#[cfg(feature = "catalog-blob")]
pub use blob::BlobCatalog;
pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use factory::create_catalog;
#[cfg(feature = "catalog-mongo")]
pub use mongo::MongoCatalog;
#[cfg(feature = "catalog-postgres")]
pub use postgres::PostgresCatalog;
