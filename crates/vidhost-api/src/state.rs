use std::sync::Arc;

use vidhost_core::Config;
use vidhost_db::Catalog;
use vidhost_processing::UploadStager;
use vidhost_storage::BlobStore;

use crate::services::ingestion::IngestionOrchestrator;

/// Process-scoped handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn Catalog>,
    pub blob_store: Arc<dyn BlobStore>,
    pub stager: UploadStager,
    pub ingestion: Arc<IngestionOrchestrator>,
}

impl AppState {
    pub fn max_video_size_bytes(&self) -> u64 {
        self.config.max_video_size_bytes() as u64
    }
}
