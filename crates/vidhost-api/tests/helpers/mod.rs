#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use vidhost_api::services::IngestionOrchestrator;
use vidhost_api::setup::routes::setup_routes;
use vidhost_api::AppState;
use vidhost_core::models::{NewVideo, UserRecord, VideoRecord};
use vidhost_core::{CatalogBackend, Config};
use vidhost_db::{BlobCatalog, Catalog, CatalogError, CatalogResult};
use vidhost_processing::{
    FfmpegArgs, FfmpegRunner, FfmpegThumbnailDeriver, MediaInput, PassthroughNormalizer,
    StagedUpload, ThumbnailDeriver, ThumbnailMode, TranscodeError, UploadStager, VideoNormalizer,
};
use vidhost_storage::{BlobObject, BlobStore, ObjectBlobStore, StorageError, StorageResult};

pub const PUBLIC_URL: &str = "https://media.example.com";

/// Shared, ordered log of side effects: `put:<key>`, `insert:<title>`.
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Blob store that records successful puts and can fail puts by key prefix.
pub struct RecordingBlobStore {
    inner: ObjectBlobStore,
    events: EventLog,
    fail_prefix: Option<&'static str>,
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        if let Some(prefix) = self.fail_prefix {
            if key.starts_with(prefix) {
                return Err(StorageError::UploadFailed("injected failure".to_string()));
            }
        }
        self.inner.put(key, data, content_type).await?;
        self.events.lock().unwrap().push(format!("put:{}", key));
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<BlobObject> {
        self.inner.get(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    fn url_for(&self, key: &str) -> Option<String> {
        self.inner.url_for(key)
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// Catalog that records inserts and can be told to fail them.
pub struct RecordingCatalog {
    inner: BlobCatalog,
    events: EventLog,
    fail_insert: bool,
}

#[async_trait]
impl Catalog for RecordingCatalog {
    async fn ensure_schema_ready(&self) -> CatalogResult<()> {
        self.inner.ensure_schema_ready().await
    }

    async fn insert_video(&self, video: NewVideo) -> CatalogResult<VideoRecord> {
        if self.fail_insert {
            return Err(CatalogError::Query("injected failure".to_string()));
        }
        let title = video.title.clone();
        let record = self.inner.insert_video(video).await?;
        self.events.lock().unwrap().push(format!("insert:{}", title));
        Ok(record)
    }

    async fn list_videos(&self) -> CatalogResult<Vec<VideoRecord>> {
        self.inner.list_videos().await
    }

    async fn list_videos_by_creator(&self, creator: &str) -> CatalogResult<Vec<VideoRecord>> {
        self.inner.list_videos_by_creator(creator).await
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> CatalogResult<Option<UserRecord>> {
        self.inner.find_user_by_credentials(username, password).await
    }

    async fn ping(&self) -> CatalogResult<()> {
        self.inner.ping().await
    }

    fn backend(&self) -> CatalogBackend {
        CatalogBackend::Blob
    }
}

/// Returns a small fixed PNG regardless of input.
pub struct FixedThumbnailDeriver;

#[async_trait]
impl ThumbnailDeriver for FixedThumbnailDeriver {
    async fn derive(
        &self,
        _source: &StagedUpload,
        _mode: ThumbnailMode,
    ) -> Result<Bytes, TranscodeError> {
        Ok(png_fixture(4, 4))
    }
}

/// Behaves like a transcoder that exited non-zero.
pub struct FailingThumbnailDeriver;

#[async_trait]
impl ThumbnailDeriver for FailingThumbnailDeriver {
    async fn derive(
        &self,
        _source: &StagedUpload,
        _mode: ThumbnailMode,
    ) -> Result<Bytes, TranscodeError> {
        Err(TranscodeError::EmptyOutput {
            operation: "thumbnail",
            stderr: "Invalid data found when processing input".to_string(),
        })
    }
}

/// Fixed PNG after a delay, long enough for a client to give up waiting.
pub struct SlowThumbnailDeriver {
    pub delay: Duration,
}

#[async_trait]
impl ThumbnailDeriver for SlowThumbnailDeriver {
    async fn derive(
        &self,
        _source: &StagedUpload,
        _mode: ThumbnailMode,
    ) -> Result<Bytes, TranscodeError> {
        tokio::time::sleep(self.delay).await;
        Ok(png_fixture(4, 4))
    }
}

pub enum Thumbnails {
    Fixed,
    Failing,
    Slow(Duration),
    Ffmpeg(FfmpegRunner),
}

pub struct TestOptions {
    pub thumbnails: Thumbnails,
    pub fail_put_prefix: Option<&'static str>,
    pub fail_insert: bool,
    pub max_video_mb: usize,
    pub url_style: &'static str,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            thumbnails: Thumbnails::Fixed,
            fail_put_prefix: None,
            fail_insert: false,
            max_video_mb: 10,
            url_style: "proxy",
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: ObjectBlobStore,
    pub events: EventLog,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let staging_dir = tempfile::tempdir().unwrap();
        let config = test_config(&options, staging_dir.path());

        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let store = ObjectBlobStore::in_memory(Some(PUBLIC_URL.to_string()));

        let blob_catalog = BlobCatalog::new(Arc::new(store.clone()), &config.catalog.blob_prefix);
        let catalog: Arc<dyn Catalog> = Arc::new(RecordingCatalog {
            inner: blob_catalog,
            events: events.clone(),
            fail_insert: options.fail_insert,
        });
        catalog.ensure_schema_ready().await.unwrap();

        let blob_store: Arc<dyn BlobStore> = Arc::new(RecordingBlobStore {
            inner: store.clone(),
            events: events.clone(),
            fail_prefix: options.fail_put_prefix,
        });

        let thumbnails: Arc<dyn ThumbnailDeriver> = match options.thumbnails {
            Thumbnails::Fixed => Arc::new(FixedThumbnailDeriver),
            Thumbnails::Failing => Arc::new(FailingThumbnailDeriver),
            Thumbnails::Slow(delay) => Arc::new(SlowThumbnailDeriver { delay }),
            Thumbnails::Ffmpeg(runner) => Arc::new(FfmpegThumbnailDeriver::new(runner)),
        };
        let normalizer: Arc<dyn VideoNormalizer> = Arc::new(PassthroughNormalizer);

        let ingestion = IngestionOrchestrator::new(
            blob_store.clone(),
            catalog.clone(),
            thumbnails,
            normalizer,
            config.media.url_style,
        );
        let state = Arc::new(AppState {
            stager: UploadStager::new(config.media.staging_dir.clone()).unwrap(),
            config: config.clone(),
            catalog,
            blob_store,
            ingestion: Arc::new(ingestion),
        });

        let router = setup_routes(&config, state.clone()).unwrap();
        let server = TestServer::new(router).unwrap();

        Self {
            server,
            state,
            store,
            events,
            staging_dir,
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn media_puts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with("put:thumbnails/") || e.starts_with("put:videos/"))
            .collect()
    }

    /// Files left in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path()).unwrap().count()
    }

    /// Provision users directly in the flat-file catalog.
    pub async fn seed_users(&self, users: &[(&str, &str, &str)]) {
        let users: Vec<serde_json::Value> = users
            .iter()
            .map(|(username, password, display_name)| {
                serde_json::json!({
                    "username": username,
                    "password": password,
                    "displayName": display_name,
                })
            })
            .collect();
        self.store
            .put(
                "catalog/users.json",
                Bytes::from(serde_json::to_vec(&users).unwrap()),
                "application/json",
            )
            .await
            .unwrap();
    }
}

pub fn test_config(options: &TestOptions, staging_dir: &Path) -> Config {
    let mut env = HashMap::new();
    env.insert("ENVIRONMENT", "test".to_string());
    env.insert("S3_ENDPOINT", "http://localhost:9000".to_string());
    env.insert("S3_ACCESS_KEY_ID", "test-key".to_string());
    env.insert("S3_SECRET_ACCESS_KEY", "test-secret".to_string());
    env.insert("S3_BUCKET", "vidhost-test".to_string());
    env.insert("S3_PUBLIC_URL", PUBLIC_URL.to_string());
    env.insert("CATALOG_BACKEND", "blob".to_string());
    env.insert("MEDIA_URL_STYLE", options.url_style.to_string());
    env.insert("VIDEO_NORMALIZATION", "passthrough".to_string());
    env.insert("MAX_VIDEO_SIZE_MB", options.max_video_mb.to_string());
    env.insert(
        "UPLOAD_STAGING_DIR",
        staging_dir.to_string_lossy().to_string(),
    );

    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
    config.validate().unwrap();
    config
}

/// Runner for the ffmpeg on PATH (or `FFMPEG_PATH`), `None` when unavailable.
pub async fn ffmpeg_runner() -> Option<FfmpegRunner> {
    let path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
    let runner = FfmpegRunner::new(path).ok()?;
    if runner.is_available().await {
        Some(runner)
    } else {
        eprintln!("ffmpeg not available, skipping");
        None
    }
}

/// A synthetic test-pattern Matroska video of `seconds` length.
pub async fn test_video(runner: &FfmpegRunner, seconds: u32) -> Bytes {
    let source = format!("testsrc=duration={}:size=320x240:rate=10", seconds);
    let args = FfmpegArgs::new()
        .input(["-f", "lavfi"])
        .output(["-pix_fmt", "yuv420p", "-f", "matroska"]);
    runner
        .run("fixture", MediaInput::File(Path::new(&source)), &args)
        .await
        .unwrap()
}

pub fn png_fixture(width: u32, height: u32) -> Bytes {
    encode_fixture(width, height, image::ImageFormat::Png)
}

pub fn jpeg_fixture(width: u32, height: u32) -> Bytes {
    encode_fixture(width, height, image::ImageFormat::Jpeg)
}

fn encode_fixture(width: u32, height: u32, format: image::ImageFormat) -> Bytes {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    Bytes::from(buf)
}
