use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use vidhost_core::models::{CreatorQuery, VideoRecord};
use vidhost_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "All videos, newest first", body = Vec<VideoRecord>),
        (status = 500, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.catalog.list_videos().await?;
    tracing::debug!(count = videos.len(), "Listed videos");
    Ok(Json(videos))
}

#[utoipa::path(
    get,
    path = "/api/videos/bycreator",
    tag = "videos",
    params(("name" = String, Query, description = "Exact creator name")),
    responses(
        (status = 200, description = "The creator's videos, newest first", body = Vec<VideoRecord>),
        (status = 400, description = "Missing creator name", body = ErrorResponse),
        (status = 500, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_videos_by_creator"))]
pub async fn list_videos_by_creator(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CreatorQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::MissingInput("Creator name is required".to_string()))?;

    let videos = state.catalog.list_videos_by_creator(&name).await?;
    tracing::debug!(creator = %name, count = videos.len(), "Listed videos by creator");
    Ok(Json(videos))
}
