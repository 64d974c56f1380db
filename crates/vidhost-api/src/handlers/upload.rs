use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};
use std::sync::Arc;
use vidhost_core::AppError;

use crate::constants::UPLOAD_SUCCESS_MESSAGE;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::stage_upload_form;

/// Multipart upload: `videoFile` (required), `thumbnailFile` (optional),
/// `videoTitle`, `creatorName`.
#[utoipa::path(
    post,
    path = "/upload_video",
    tag = "upload",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "videoFile, optional thumbnailFile, videoTitle and creatorName"
    ),
    responses(
        (status = 200, description = "Video ingested", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or invalid input", body = ErrorResponse),
        (status = 413, description = "Video too large", body = ErrorResponse),
        (status = 500, description = "Ingestion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let request =
        stage_upload_form(multipart, &state.stager, state.max_video_size_bytes()).await?;

    // Awaiting the handle only observes the outcome; dropping it does not
    // cancel the ingestion.
    state
        .ingestion
        .spawn(request)
        .await
        .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))??;

    Ok(UPLOAD_SUCCESS_MESSAGE)
}
