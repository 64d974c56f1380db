use crate::catalog::{Catalog, CatalogError, CatalogResult};
use std::sync::Arc;
use vidhost_core::{CatalogBackend, CatalogConfig};
use vidhost_storage::BlobStore;

/// Create the catalog selected by `CATALOG_BACKEND`.
///
/// The blob store is only used by the flat-file backend.
pub async fn create_catalog(
    config: &CatalogConfig,
    blob_store: Arc<dyn BlobStore>,
) -> CatalogResult<Arc<dyn Catalog>> {
    match config.backend {
        #[cfg(feature = "catalog-postgres")]
        CatalogBackend::Postgres => {
            tracing::info!("Initializing PostgreSQL catalog");
            let catalog = crate::postgres::PostgresCatalog::connect(config).await?;
            Ok(Arc::new(catalog))
        }

        #[cfg(feature = "catalog-mongo")]
        CatalogBackend::Mongo => {
            tracing::info!("Initializing MongoDB catalog");
            let catalog = crate::mongo::MongoCatalog::connect(config).await?;
            Ok(Arc::new(catalog))
        }

        #[cfg(feature = "catalog-blob")]
        CatalogBackend::Blob => {
            tracing::info!(
                prefix = %config.blob_prefix,
                backend = blob_store.backend_name(),
                "Initializing flat-file catalog"
            );
            let catalog = crate::blob::BlobCatalog::new(blob_store, &config.blob_prefix);
            Ok(Arc::new(catalog))
        }

        #[allow(unreachable_patterns)]
        other => {
            let _ = blob_store;
            Err(CatalogError::Unavailable(format!(
                "{} catalog backend not compiled in",
                other
            )))
        }
    }
}
