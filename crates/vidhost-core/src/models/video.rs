use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog entry for one ingested video.
///
/// Only written after both the thumbnail and the video blob exist, so the
/// locators always point at stored objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Backend-assigned opaque identifier
    pub id: String,
    pub title: String,
    pub creator: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Insert payload for a catalog record. The backend assigns `id` and
/// `uploaded_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub creator: String,
    pub video_url: String,
    pub thumbnail_url: String,
}

impl NewVideo {
    pub fn into_record(self, id: String, uploaded_at: DateTime<Utc>) -> VideoRecord {
        VideoRecord {
            id,
            title: self.title,
            creator: self.creator,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            uploaded_at,
        }
    }
}

/// Query parameters for `GET /api/videos/bycreator`
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatorQuery {
    pub name: Option<String>,
}
