//! Upload ingestion
//!
//! One ingestion turns a staged upload into two blobs and a catalog record:
//!
//! ```text
//! Received -> Staged -> ThumbnailReady -> VideoReady
//!          -> ThumbnailUploaded -> VideoUploaded -> CatalogWritten -> CleanedUp
//! ```
//!
//! Any stage may move to `Failed`, which still ends in `CleanedUp`. Blob
//! puts run thumbnail first, then video, and the catalog insert only happens
//! once both exist. Nothing is rolled back: blobs written before a later
//! failure are left in place and logged.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::Instrument;
use vidhost_core::models::{NewVideo, VideoRecord};
use vidhost_core::{AppError, UrlStyle};
use vidhost_db::Catalog;
use vidhost_processing::{
    StagedUpload, ThumbnailDeriver, ThumbnailMode, VideoNormalizer, THUMBNAIL_CONTENT_TYPE,
};
use vidhost_storage::keys::{generate_object_name, thumbnail_key, video_key};
use vidhost_storage::BlobStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionStage {
    Received,
    Staged,
    ThumbnailReady,
    VideoReady,
    ThumbnailUploaded,
    VideoUploaded,
    CatalogWritten,
    /// Carries the error type name of the failure
    Failed(String),
    CleanedUp,
}

impl fmt::Display for IngestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionStage::Received => write!(f, "received"),
            IngestionStage::Staged => write!(f, "staged"),
            IngestionStage::ThumbnailReady => write!(f, "thumbnail_ready"),
            IngestionStage::VideoReady => write!(f, "video_ready"),
            IngestionStage::ThumbnailUploaded => write!(f, "thumbnail_uploaded"),
            IngestionStage::VideoUploaded => write!(f, "video_uploaded"),
            IngestionStage::CatalogWritten => write!(f, "catalog_written"),
            IngestionStage::Failed(reason) => write!(f, "failed({})", reason),
            IngestionStage::CleanedUp => write!(f, "cleaned_up"),
        }
    }
}

/// Parsed upload form. Owns the staged files until the ingestion ends.
#[derive(Debug)]
pub struct IngestionRequest {
    pub title: String,
    pub creator: String,
    pub video: StagedUpload,
    pub thumbnail: Option<StagedUpload>,
}

/// Stage history of one ingestion.
#[derive(Debug)]
pub struct StageTrace {
    stages: Vec<IngestionStage>,
    started: Instant,
}

impl StageTrace {
    fn new() -> Self {
        Self {
            stages: vec![IngestionStage::Received],
            started: Instant::now(),
        }
    }

    pub fn current(&self) -> &IngestionStage {
        // Never empty: starts at Received
        &self.stages[self.stages.len() - 1]
    }

    pub fn stages(&self) -> &[IngestionStage] {
        &self.stages
    }

    fn advance(&mut self, next: IngestionStage) {
        tracing::debug!(
            from = %self.current(),
            to = %next,
            elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "Ingestion stage transition"
        );
        self.stages.push(next);
    }

    fn fail(&mut self, error: &AppError) {
        tracing::error!(
            stage = %self.current(),
            error_type = error.error_type(),
            error = %error.detailed_message(),
            "Ingestion failed"
        );
        self.stages
            .push(IngestionStage::Failed(error.error_type().to_string()));
    }
}

pub struct IngestionOrchestrator {
    blob_store: Arc<dyn BlobStore>,
    catalog: Arc<dyn Catalog>,
    thumbnails: Arc<dyn ThumbnailDeriver>,
    normalizer: Arc<dyn VideoNormalizer>,
    url_style: UrlStyle,
}

impl IngestionOrchestrator {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        catalog: Arc<dyn Catalog>,
        thumbnails: Arc<dyn ThumbnailDeriver>,
        normalizer: Arc<dyn VideoNormalizer>,
        url_style: UrlStyle,
    ) -> Self {
        Self {
            blob_store,
            catalog,
            thumbnails,
            normalizer,
            url_style,
        }
    }

    /// Run one ingestion on its own task. Dropping the handle does not stop
    /// it.
    pub fn spawn(
        self: &Arc<Self>,
        request: IngestionRequest,
    ) -> JoinHandle<Result<VideoRecord, AppError>> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.ingest(request).await }.in_current_span())
    }

    /// Run one ingestion to completion. Staged uploads are released on every
    /// path.
    pub async fn ingest(&self, request: IngestionRequest) -> Result<VideoRecord, AppError> {
        self.ingest_traced(request).await.0
    }

    /// `ingest`, also returning the stages passed through.
    #[tracing::instrument(
        skip(self, request),
        fields(
            operation = "ingest",
            creator = %request.creator,
            video_bytes = request.video.size(),
            has_thumbnail = request.thumbnail.is_some(),
        )
    )]
    pub async fn ingest_traced(
        &self,
        request: IngestionRequest,
    ) -> (Result<VideoRecord, AppError>, StageTrace) {
        let mut trace = StageTrace::new();
        let IngestionRequest {
            title,
            creator,
            video,
            thumbnail,
        } = request;

        let result = match validate_fields(&title, &creator, &video) {
            Ok(()) => {
                trace.advance(IngestionStage::Staged);
                self.run(&mut trace, title, creator, &video, thumbnail.as_ref())
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            trace.fail(e);
        }

        video.release();
        if let Some(thumbnail) = thumbnail {
            thumbnail.release();
        }
        trace.advance(IngestionStage::CleanedUp);

        if let Ok(record) = &result {
            tracing::info!(
                video_id = %record.id,
                video_url = %record.video_url,
                duration_ms = trace.started.elapsed().as_secs_f64() * 1000.0,
                "Video ingested"
            );
        }

        (result, trace)
    }

    async fn run(
        &self,
        trace: &mut StageTrace,
        title: String,
        creator: String,
        video: &StagedUpload,
        thumbnail: Option<&StagedUpload>,
    ) -> Result<VideoRecord, AppError> {
        let (source, mode) = match thumbnail {
            Some(image) => (image, ThumbnailMode::FromSuppliedImage),
            None => (video, ThumbnailMode::FromVideoFrame),
        };
        let png = self
            .thumbnails
            .derive(source, mode)
            .await
            .map_err(|e| AppError::ThumbnailDerivationFailed(e.to_string()))?;
        trace.advance(IngestionStage::ThumbnailReady);

        let normalized = self
            .normalizer
            .normalize(video)
            .await
            .map_err(|e| AppError::VideoNormalizationFailed(e.to_string()))?;
        trace.advance(IngestionStage::VideoReady);

        let name = generate_object_name();
        let thumb_key = thumbnail_key(&name);
        let vid_key = video_key(&name, &normalized.extension);
        let thumbnail_url = self.locator(&thumb_key)?;
        let video_url = self.locator(&vid_key)?;

        self.blob_store
            .put(&thumb_key, png, THUMBNAIL_CONTENT_TYPE)
            .await
            .map_err(|e| AppError::UploadFailed(e.to_string()))?;
        trace.advance(IngestionStage::ThumbnailUploaded);

        if let Err(e) = self
            .blob_store
            .put(&vid_key, normalized.bytes, &normalized.content_type)
            .await
        {
            tracing::warn!(orphaned_keys = ?[&thumb_key], "Blobs left without catalog record");
            return Err(AppError::UploadFailed(e.to_string()));
        }
        trace.advance(IngestionStage::VideoUploaded);

        let new_video = NewVideo {
            title,
            creator,
            video_url,
            thumbnail_url,
        };
        let record = match self.catalog.insert_video(new_video).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    orphaned_keys = ?[&thumb_key, &vid_key],
                    "Blobs left without catalog record"
                );
                return Err(AppError::CatalogWriteFailed(e.to_string()));
            }
        };
        trace.advance(IngestionStage::CatalogWritten);

        Ok(record)
    }

    /// Locator stored in the catalog for `key`.
    pub fn locator(&self, key: &str) -> Result<String, AppError> {
        match self.url_style {
            UrlStyle::Public => self.blob_store.url_for(key).ok_or_else(|| {
                AppError::Internal("Public URL style without S3_PUBLIC_URL".to_string())
            }),
            UrlStyle::Proxy => Ok(format!("/api/{}", key)),
        }
    }
}

fn validate_fields(title: &str, creator: &str, video: &StagedUpload) -> Result<(), AppError> {
    if video.size() == 0 {
        return Err(AppError::MissingInput("Video file is required".to_string()));
    }
    if title.trim().is_empty() {
        return Err(AppError::MissingInput("Video title is required".to_string()));
    }
    if creator.trim().is_empty() {
        return Err(AppError::MissingInput("Creator name is required".to_string()));
    }
    Ok(())
}

#[cfg(all(test, feature = "catalog-blob"))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use vidhost_db::BlobCatalog;
    use vidhost_processing::{NormalizedVideo, TranscodeError, UploadKind, UploadStager};
    use vidhost_storage::ObjectBlobStore;

    struct FixedThumbnail;

    #[async_trait]
    impl ThumbnailDeriver for FixedThumbnail {
        async fn derive(
            &self,
            _source: &StagedUpload,
            _mode: ThumbnailMode,
        ) -> Result<Bytes, TranscodeError> {
            Ok(Bytes::from_static(b"\x89PNG fake"))
        }
    }

    struct BrokenNormalizer;

    #[async_trait]
    impl VideoNormalizer for BrokenNormalizer {
        async fn normalize(
            &self,
            _source: &StagedUpload,
        ) -> Result<NormalizedVideo, TranscodeError> {
            Err(TranscodeError::Io(std::io::Error::other("codec missing")))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn orchestrator(
        store: Arc<ObjectBlobStore>,
        normalizer: Arc<dyn VideoNormalizer>,
        url_style: UrlStyle,
    ) -> IngestionOrchestrator {
        let catalog = Arc::new(BlobCatalog::new(store.clone(), "catalog/"));
        IngestionOrchestrator::new(
            store,
            catalog,
            Arc::new(FixedThumbnail),
            normalizer,
            url_style,
        )
    }

    async fn staged_video(stager: &UploadStager, data: &[u8]) -> StagedUpload {
        let mut file = stager
            .create_file(
                UploadKind::Video,
                Some("clip.mp4".to_string()),
                Some("video/mp4".to_string()),
                None,
            )
            .unwrap();
        file.write_chunk(data).await.unwrap();
        file.finish().await.unwrap()
    }

    #[tokio::test]
    async fn test_successful_ingestion_passes_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let stager = UploadStager::new(Some(dir.path().to_path_buf())).unwrap();
        let store = Arc::new(ObjectBlobStore::in_memory(None));
        let orchestrator = orchestrator(
            store.clone(),
            Arc::new(vidhost_processing::PassthroughNormalizer),
            UrlStyle::Proxy,
        );

        let request = IngestionRequest {
            title: "Clip".to_string(),
            creator: "alice".to_string(),
            video: staged_video(&stager, b"video-bytes").await,
            thumbnail: None,
        };
        let (result, trace) = orchestrator.ingest_traced(request).await;
        let record = result.unwrap();

        assert_eq!(
            trace.stages(),
            &[
                IngestionStage::Received,
                IngestionStage::Staged,
                IngestionStage::ThumbnailReady,
                IngestionStage::VideoReady,
                IngestionStage::ThumbnailUploaded,
                IngestionStage::VideoUploaded,
                IngestionStage::CatalogWritten,
                IngestionStage::CleanedUp,
            ]
        );
        assert!(record.video_url.starts_with("/api/videos/"));
        assert!(record.video_url.ends_with(".mp4"));
        assert!(record.thumbnail_url.starts_with("/api/thumbnails/"));

        let video_key = record.video_url.trim_start_matches("/api/");
        let stored = store.get(video_key).await.unwrap();
        assert_eq!(stored.bytes().await.unwrap(), Bytes::from_static(b"video-bytes"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_normalizer_failure_stops_before_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let stager = UploadStager::new(Some(dir.path().to_path_buf())).unwrap();
        let store = Arc::new(ObjectBlobStore::in_memory(None));
        let orchestrator = orchestrator(store.clone(), Arc::new(BrokenNormalizer), UrlStyle::Proxy);

        let request = IngestionRequest {
            title: "Clip".to_string(),
            creator: "alice".to_string(),
            video: staged_video(&stager, b"video-bytes").await,
            thumbnail: None,
        };
        let (result, trace) = orchestrator.ingest_traced(request).await;

        assert!(matches!(result, Err(AppError::VideoNormalizationFailed(_))));
        let stages = trace.stages();
        assert_eq!(
            stages[stages.len() - 2],
            IngestionStage::Failed("VideoNormalizationFailed".to_string())
        );
        assert_eq!(trace.current(), &IngestionStage::CleanedUp);
        assert!(!stages.contains(&IngestionStage::ThumbnailUploaded));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_blank_title_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let stager = UploadStager::new(Some(dir.path().to_path_buf())).unwrap();
        let store = Arc::new(ObjectBlobStore::in_memory(None));
        let orchestrator = orchestrator(
            store,
            Arc::new(vidhost_processing::PassthroughNormalizer),
            UrlStyle::Proxy,
        );

        let request = IngestionRequest {
            title: "   ".to_string(),
            creator: "alice".to_string(),
            video: staged_video(&stager, b"video-bytes").await,
            thumbnail: None,
        };
        let (result, trace) = orchestrator.ingest_traced(request).await;

        assert!(matches!(result, Err(AppError::MissingInput(_))));
        assert!(!trace.stages().contains(&IngestionStage::Staged));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_public_locator_uses_store_url() {
        let store = Arc::new(ObjectBlobStore::in_memory(Some(
            "https://media.example.com".to_string(),
        )));
        let orchestrator = orchestrator(
            store,
            Arc::new(vidhost_processing::PassthroughNormalizer),
            UrlStyle::Public,
        );
        assert_eq!(
            orchestrator.locator("videos/1-a.mp4").unwrap(),
            "https://media.example.com/videos/1-a.mp4"
        );
    }

    #[test]
    fn test_public_locator_without_base_is_internal_error() {
        let store = Arc::new(ObjectBlobStore::in_memory(None));
        let orchestrator = orchestrator(
            store,
            Arc::new(vidhost_processing::PassthroughNormalizer),
            UrlStyle::Public,
        );
        assert!(matches!(
            orchestrator.locator("videos/1-a.mp4"),
            Err(AppError::Internal(_))
        ));
    }
}
