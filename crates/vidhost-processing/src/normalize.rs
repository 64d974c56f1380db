//! Video normalization
//!
//! The normalizer decides which bytes are stored for the video. Passthrough
//! stores the upload unchanged; the ffmpeg normalizer re-encodes to a
//! fragmented MP4 (H.264 + AAC) so it can be written to a pipe.

use crate::staging::StagedUpload;
use crate::transcode::{FfmpegArgs, FfmpegRunner, TranscodeError};
use async_trait::async_trait;
use bytes::Bytes;

/// Video bytes ready for upload.
#[derive(Debug, Clone)]
pub struct NormalizedVideo {
    pub bytes: Bytes,
    pub content_type: String,
    /// Extension without the dot
    pub extension: String,
}

#[async_trait]
pub trait VideoNormalizer: Send + Sync {
    async fn normalize(&self, source: &StagedUpload) -> Result<NormalizedVideo, TranscodeError>;

    fn name(&self) -> &'static str;
}

/// Forwards the staged bytes with the client's content type and extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughNormalizer;

#[async_trait]
impl VideoNormalizer for PassthroughNormalizer {
    async fn normalize(&self, source: &StagedUpload) -> Result<NormalizedVideo, TranscodeError> {
        let bytes = source.read_bytes().await?;
        let extension = source
            .extension()
            .or_else(|| extension_for_content_type(source.content_type()?).map(String::from))
            .unwrap_or_else(|| "bin".to_string());
        let content_type = source
            .content_type()
            .filter(|ct| !ct.is_empty())
            .map(String::from)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(NormalizedVideo {
            bytes,
            content_type,
            extension,
        })
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

pub struct FfmpegVideoNormalizer {
    runner: FfmpegRunner,
}

impl FfmpegVideoNormalizer {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }

    fn args() -> FfmpegArgs {
        FfmpegArgs::new().output([
            "-c:v",
            "libx264",
            "-preset",
            "veryfast",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-movflags",
            "frag_keyframe+empty_moov",
            "-f",
            "mp4",
        ])
    }
}

#[async_trait]
impl VideoNormalizer for FfmpegVideoNormalizer {
    async fn normalize(&self, source: &StagedUpload) -> Result<NormalizedVideo, TranscodeError> {
        tracing::debug!(
            kind = %source.kind(),
            size_bytes = source.size(),
            "Normalizing video to MP4"
        );
        let bytes = self
            .runner
            .run("normalize", source.as_input(), &Self::args())
            .await?;

        Ok(NormalizedVideo {
            bytes,
            content_type: "video/mp4".to_string(),
            extension: "mp4".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next()?.trim() {
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "video/x-matroska" => Some("mkv"),
        "video/x-msvideo" => Some("avi"),
        _ => None,
    }
}
