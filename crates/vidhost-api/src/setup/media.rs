//! Upload staging and ffmpeg-backed processors

use anyhow::{Context, Result};
use std::sync::Arc;
use vidhost_core::{Config, NormalizationMode};
use vidhost_processing::{
    FfmpegRunner, FfmpegThumbnailDeriver, FfmpegVideoNormalizer, PassthroughNormalizer,
    ThumbnailDeriver, UploadStager, VideoNormalizer,
};

pub struct MediaServices {
    pub stager: UploadStager,
    pub thumbnails: Arc<dyn ThumbnailDeriver>,
    pub normalizer: Arc<dyn VideoNormalizer>,
}

pub async fn setup_media(config: &Config) -> Result<MediaServices> {
    let stager = UploadStager::new(config.media.staging_dir.clone())
        .context("Failed to prepare upload staging directory")?;

    let runner = FfmpegRunner::new(config.media.ffmpeg_path.clone())
        .context("Invalid FFMPEG_PATH")?;
    if !runner.is_available().await {
        tracing::warn!(
            ffmpeg_path = %runner.ffmpeg_path(),
            "ffmpeg is not executable; uploads will fail until it is installed"
        );
    }

    let normalizer: Arc<dyn VideoNormalizer> = match config.media.normalization {
        NormalizationMode::Transcode => Arc::new(FfmpegVideoNormalizer::new(runner.clone())),
        NormalizationMode::Passthrough => Arc::new(PassthroughNormalizer),
    };
    let thumbnails: Arc<dyn ThumbnailDeriver> = Arc::new(FfmpegThumbnailDeriver::new(runner));

    tracing::info!(
        staging_dir = %stager.dir().display(),
        normalizer = normalizer.name(),
        "Media processing initialized"
    );

    Ok(MediaServices {
        stager,
        thumbnails,
        normalizer,
    })
}
