//! Key naming for stored media.
//!
//! Thumbnails live under `thumbnails/` and videos under `videos/`. Object
//! names are `<unix-millis>-<uuid simple>` so they sort by upload time and
//! never collide.

use crate::traits::{StorageError, StorageResult};
use uuid::Uuid;

pub const THUMBNAIL_PREFIX: &str = "thumbnails/";
pub const VIDEO_PREFIX: &str = "videos/";

/// Fresh object name without extension.
pub fn generate_object_name() -> String {
    format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

pub fn thumbnail_key(name: &str) -> String {
    format!("{}{}.png", THUMBNAIL_PREFIX, name)
}

pub fn video_key(name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{}{}", VIDEO_PREFIX, name)
    } else {
        format!("{}{}.{}", VIDEO_PREFIX, name, extension)
    }
}

/// Validate a client-supplied file name before it becomes part of a key.
pub fn validate_file_name(file_name: &str) -> StorageResult<()> {
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
    {
        return Err(StorageError::InvalidKey(file_name.to_string()));
    }
    Ok(())
}

/// Lower-cased extension of `file_name` without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}

/// Content type implied by a key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    match extension_of(key).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
