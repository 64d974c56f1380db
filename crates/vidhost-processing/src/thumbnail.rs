//! Thumbnail derivation
//!
//! A thumbnail is always a PNG. A supplied image is re-encoded as-is; a video
//! yields the frame at 00:00:05 scaled to 400x225.

use crate::staging::StagedUpload;
use crate::transcode::{FfmpegArgs, FfmpegRunner, TranscodeError};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

pub const THUMBNAIL_CONTENT_TYPE: &str = "image/png";
pub const FRAME_SEEK_POSITION: &str = "00:00:05";
pub const FRAME_SCALE: &str = "scale=400:225";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailMode {
    /// Re-encode a client-supplied image to PNG without resizing
    FromSuppliedImage,
    /// Extract one frame from the video
    FromVideoFrame,
}

impl fmt::Display for ThumbnailMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThumbnailMode::FromSuppliedImage => write!(f, "from_supplied_image"),
            ThumbnailMode::FromVideoFrame => write!(f, "from_video_frame"),
        }
    }
}

#[async_trait]
pub trait ThumbnailDeriver: Send + Sync {
    /// Produce PNG bytes from `source`.
    async fn derive(&self, source: &StagedUpload, mode: ThumbnailMode)
        -> Result<Bytes, TranscodeError>;
}

pub struct FfmpegThumbnailDeriver {
    runner: FfmpegRunner,
}

impl FfmpegThumbnailDeriver {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    fn args(mode: ThumbnailMode) -> FfmpegArgs {
        let png_out = ["-f", "image2pipe", "-vcodec", "png"];
        match mode {
            ThumbnailMode::FromSuppliedImage => FfmpegArgs::new()
                .output(["-frames:v", "1"])
                .output(png_out),
            ThumbnailMode::FromVideoFrame => FfmpegArgs::new()
                .input(["-ss", FRAME_SEEK_POSITION])
                .output(["-vframes", "1", "-vf", FRAME_SCALE])
                .output(png_out),
        }
    }
}

#[async_trait]
impl ThumbnailDeriver for FfmpegThumbnailDeriver {
    async fn derive(
        &self,
        source: &StagedUpload,
        mode: ThumbnailMode,
    ) -> Result<Bytes, TranscodeError> {
        tracing::debug!(
            mode = %mode,
            kind = %source.kind(),
            size_bytes = source.size(),
            "Deriving thumbnail"
        );
        self.runner
            .run("thumbnail", source.as_input(), &Self::args(mode))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::{UploadKind, UploadStager};
    use crate::test_support::{ffmpeg_runner, jpeg_fixture, write_test_video};

    #[test]
    fn test_video_frame_args() {
        let args = FfmpegThumbnailDeriver::args(ThumbnailMode::FromVideoFrame);
        assert_eq!(args.input_args, vec!["-ss", "00:00:05"]);
        assert_eq!(
            args.output_args,
            vec!["-vframes", "1", "-vf", "scale=400:225", "-f", "image2pipe", "-vcodec", "png"]
        );
    }

    #[test]
    fn test_supplied_image_args_do_not_resize() {
        let args = FfmpegThumbnailDeriver::args(ThumbnailMode::FromSuppliedImage);
        assert!(args.input_args.is_empty());
        assert!(!args.output_args.iter().any(|a| a.contains("scale")));
    }

    #[tokio::test]
    async fn test_frame_from_video_is_400x225_png() {
        let Some(runner) = ffmpeg_runner().await else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let stager = UploadStager::new(Some(dir.path().to_path_buf())).unwrap();
        let staged = write_test_video(&runner, &stager, 7).await;

        let deriver = FfmpegThumbnailDeriver::new(runner);
        let png = deriver
            .derive(&staged, ThumbnailMode::FromVideoFrame)
            .await
            .unwrap();

        let img = image::load_from_memory_with_format(&png, image::ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (400, 225));
        staged.release();
    }

    #[tokio::test]
    async fn test_supplied_jpeg_is_reencoded_without_resize() {
        let Some(runner) = ffmpeg_runner().await else {
            return;
        };
        let staged = StagedUpload::in_memory(
            UploadKind::Thumbnail,
            jpeg_fixture(64, 48),
            Some("thumb.jpg".to_string()),
            Some("image/jpeg".to_string()),
        );

        let deriver = FfmpegThumbnailDeriver::new(runner);
        let png = deriver
            .derive(&staged, ThumbnailMode::FromSuppliedImage)
            .await
            .unwrap();

        let img = image::load_from_memory_with_format(&png, image::ImageFormat::Png).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[tokio::test]
    async fn test_garbage_input_fails_with_stderr() {
        let Some(runner) = ffmpeg_runner().await else {
            return;
        };
        let staged = StagedUpload::in_memory(
            UploadKind::Video,
            Bytes::from_static(b"definitely not a video"),
            Some("junk.mp4".to_string()),
            None,
        );

        let deriver = FfmpegThumbnailDeriver::new(runner);
        let err = deriver
            .derive(&staged, ThumbnailMode::FromVideoFrame)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::Failed { .. } | TranscodeError::EmptyOutput { .. }
        ));
    }
}
