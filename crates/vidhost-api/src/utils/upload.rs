//! Multipart upload parsing
//!
//! Reads the `/upload_video` form into staged uploads. The video part is
//! streamed to a staged file chunk by chunk and capped at the configured
//! size; the optional thumbnail is small and held in memory.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use vidhost_core::AppError;
use vidhost_processing::{StagedUpload, UploadKind, UploadStager};

use crate::error::HttpAppError;
use crate::services::ingestion::IngestionRequest;

pub const VIDEO_FIELD: &str = "videoFile";
pub const THUMBNAIL_FIELD: &str = "thumbnailFile";
pub const TITLE_FIELD: &str = "videoTitle";
pub const CREATOR_FIELD: &str = "creatorName";

#[derive(Debug, Default)]
struct UploadForm {
    title: Option<String>,
    creator: Option<String>,
    video: Option<StagedUpload>,
    thumbnail: Option<StagedUpload>,
}

impl UploadForm {
    fn release(self) {
        if let Some(video) = self.video {
            video.release();
        }
        if let Some(thumbnail) = self.thumbnail {
            thumbnail.release();
        }
    }
}

fn multipart_error(err: MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HttpAppError(AppError::PayloadTooLarge(err.body_text()))
    } else {
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart body: {}",
            err.body_text()
        )))
    }
}

/// Parse the upload form and stage its files.
///
/// Unknown fields are skipped. A second `videoFile` or `thumbnailFile` part
/// is rejected. An empty file part counts as absent. On any error, whatever
/// was staged so far is released before returning.
pub async fn stage_upload_form(
    mut multipart: Multipart,
    stager: &UploadStager,
    max_video_bytes: u64,
) -> Result<IngestionRequest, HttpAppError> {
    let mut form = UploadForm::default();

    if let Err(e) = read_fields(&mut multipart, &mut form, stager, max_video_bytes).await {
        form.release();
        return Err(e);
    }

    let UploadForm {
        title,
        creator,
        video,
        thumbnail,
    } = form;

    match (title, creator, video) {
        (Some(title), Some(creator), Some(video)) => Ok(IngestionRequest {
            title,
            creator,
            video,
            thumbnail,
        }),
        (title, creator, video) => {
            let message = if video.is_none() {
                "Video file is required"
            } else if title.is_none() {
                "Video title is required"
            } else if creator.is_none() {
                "Creator name is required"
            } else {
                "Missing required upload fields"
            };
            UploadForm {
                title,
                creator,
                video,
                thumbnail,
            }
            .release();
            Err(HttpAppError(AppError::MissingInput(message.to_string())))
        }
    }
}

async fn read_fields(
    multipart: &mut Multipart,
    form: &mut UploadForm,
    stager: &UploadStager,
    max_video_bytes: u64,
) -> Result<(), HttpAppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            VIDEO_FIELD => {
                if form.video.is_some() {
                    return Err(duplicate_field(VIDEO_FIELD));
                }
                form.video = stage_video(field, stager, max_video_bytes).await?;
            }
            THUMBNAIL_FIELD => {
                if form.thumbnail.is_some() {
                    return Err(duplicate_field(THUMBNAIL_FIELD));
                }
                form.thumbnail = read_thumbnail(field).await?;
            }
            TITLE_FIELD => {
                form.title = read_text(field).await?;
            }
            CREATOR_FIELD => {
                form.creator = read_text(field).await?;
            }
            _ => {
                tracing::debug!(field = %name, "Skipping unknown multipart field");
            }
        }
    }

    Ok(())
}

fn duplicate_field(name: &str) -> HttpAppError {
    HttpAppError(AppError::InvalidInput(format!(
        "Only one {} part is allowed",
        name
    )))
}

async fn stage_video(
    mut field: Field<'_>,
    stager: &UploadStager,
    max_video_bytes: u64,
) -> Result<Option<StagedUpload>, HttpAppError> {
    let file_name = field.file_name().map(sanitize_filename);
    let content_type = field.content_type().map(String::from);

    let mut file = stager.create_file(
        UploadKind::Video,
        file_name,
        content_type,
        Some(max_video_bytes),
    )?;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_chunk(&chunk).await?;
    }

    if file.written() == 0 {
        // Dropping the staging file removes it
        return Ok(None);
    }

    let staged = file.finish().await?;
    tracing::debug!(size_bytes = staged.size(), "Video part staged");
    Ok(Some(staged))
}

async fn read_thumbnail(field: Field<'_>) -> Result<Option<StagedUpload>, HttpAppError> {
    let file_name = field.file_name().map(sanitize_filename);
    let content_type = field.content_type().map(String::from);
    let data = field.bytes().await.map_err(multipart_error)?;

    if data.is_empty() {
        return Ok(None);
    }

    Ok(Some(StagedUpload::in_memory(
        UploadKind::Thumbnail,
        data,
        file_name,
        content_type,
    )))
}

async fn read_text(field: Field<'_>) -> Result<Option<String>, HttpAppError> {
    let text = field.text().await.map_err(multipart_error)?;
    let text = text.trim();
    Ok(if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    })
}

/// Keep the last path component of a client file name, without control
/// characters.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    base.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
