//! Application state assembly

use std::sync::Arc;
use vidhost_core::Config;
use vidhost_db::Catalog;
use vidhost_storage::BlobStore;

use super::media::MediaServices;
use crate::services::IngestionOrchestrator;
use crate::state::AppState;

pub fn build_state(
    config: &Config,
    catalog: Arc<dyn Catalog>,
    blob_store: Arc<dyn BlobStore>,
    media: MediaServices,
) -> Arc<AppState> {
    let ingestion = IngestionOrchestrator::new(
        blob_store.clone(),
        catalog.clone(),
        media.thumbnails,
        media.normalizer,
        config.media.url_style,
    );

    Arc::new(AppState {
        config: config.clone(),
        catalog,
        blob_store,
        stager: media.stager,
        ingestion: Arc::new(ingestion),
    })
}
