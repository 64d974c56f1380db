//! vidhost Processing Library
//!
//! Everything that touches raw upload bytes before they are stored:
//! request-scoped staging, thumbnail derivation, and video normalization.
//! Transcoding shells out to `ffmpeg`; no media codec is linked in.

pub mod normalize;
pub mod staging;
pub mod thumbnail;
pub mod transcode;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use normalize::{FfmpegVideoNormalizer, NormalizedVideo, PassthroughNormalizer, VideoNormalizer};
pub use staging::{StagedUpload, StagingError, StagingFile, UploadKind, UploadStager};
pub use thumbnail::{
    FfmpegThumbnailDeriver, ThumbnailDeriver, ThumbnailMode, THUMBNAIL_CONTENT_TYPE,
};
pub use transcode::{FfmpegArgs, FfmpegRunner, MediaInput, TranscodeError};
