//! Read-through proxy for stored media
//!
//! Streams blobs from the store so clients never need direct bucket access.
//! Used when the catalog stores proxy locators (`/api/thumbnails/...`,
//! `/api/videos/...`).

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use futures::StreamExt;
use std::sync::Arc;
use vidhost_core::AppError;
use vidhost_storage::keys::{validate_file_name, THUMBNAIL_PREFIX, VIDEO_PREFIX};

use crate::constants::{CROSS_ORIGIN_RESOURCE_POLICY, MEDIA_CACHE_CONTROL};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/thumbnails/{fileName}",
    tag = "media",
    params(("fileName" = String, Path, description = "Thumbnail file name")),
    responses(
        (status = 200, description = "Thumbnail bytes", content_type = "image/png"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "Thumbnail not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_thumbnail"))]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, HttpAppError> {
    proxy_blob(&state, THUMBNAIL_PREFIX, &file_name).await
}

#[utoipa::path(
    get,
    path = "/api/videos/{fileName}",
    tag = "media",
    params(("fileName" = String, Path, description = "Video file name")),
    responses(
        (status = 200, description = "Video bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, HttpAppError> {
    proxy_blob(&state, VIDEO_PREFIX, &file_name).await
}

async fn proxy_blob(
    state: &AppState,
    prefix: &str,
    file_name: &str,
) -> Result<Response, HttpAppError> {
    validate_file_name(file_name)?;
    let key = format!("{}{}", prefix, file_name);

    let object = state.blob_store.get(&key).await?;

    tracing::debug!(
        key = %key,
        content_type = %object.content_type,
        size_bytes = object.size,
        "Streaming blob"
    );

    let body = Body::from_stream(
        object
            .stream
            .map(|r| r.map_err(|e| std::io::Error::other(e.to_string()))),
    );

    Response::builder()
        .header(header::CONTENT_TYPE, object.content_type)
        .header(header::CONTENT_LENGTH, object.size)
        .header(header::CACHE_CONTROL, MEDIA_CACHE_CONTROL)
        .header("Cross-Origin-Resource-Policy", CROSS_ORIGIN_RESOURCE_POLICY)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}
