//! Transient upload staging
//!
//! A staged upload lives for one request. Disk-backed uploads are temp files
//! named `upload-<random><.ext>` in the staging directory; memory-backed
//! uploads are plain buffers. `StagedUpload::release` deletes the file and
//! logs a failure instead of returning it. A staged upload dropped without
//! release (panic, cancelled request) still has its file removed by the
//! `TempPath` guard.

use crate::transcode::MediaInput;
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Staging IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Video,
    Thumbnail,
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadKind::Video => write!(f, "video"),
            UploadKind::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

pub enum StagedSource {
    Disk(TempPath),
    Memory(Bytes),
}

impl fmt::Debug for StagedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagedSource::Disk(path) => f.debug_tuple("Disk").field(&path.to_path_buf()).finish(),
            StagedSource::Memory(data) => f.debug_tuple("Memory").field(&data.len()).finish(),
        }
    }
}

/// Raw upload bytes held for the duration of one request.
#[derive(Debug)]
pub struct StagedUpload {
    source: StagedSource,
    kind: UploadKind,
    file_name: Option<String>,
    content_type: Option<String>,
    size: u64,
}

impl StagedUpload {
    pub fn in_memory(
        kind: UploadKind,
        data: Bytes,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            size: data.len() as u64,
            source: StagedSource::Memory(data),
            kind,
            file_name,
            content_type,
        }
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Path of the staged file, if disk-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            StagedSource::Disk(path) => Some(&**path),
            StagedSource::Memory(_) => None,
        }
    }

    /// Lower-cased extension from the client's file name.
    pub fn extension(&self) -> Option<String> {
        self.file_name.as_deref().and_then(extension_of)
    }

    pub fn as_input(&self) -> MediaInput<'_> {
        match &self.source {
            StagedSource::Disk(path) => MediaInput::File(&**path),
            StagedSource::Memory(data) => MediaInput::Memory(data),
        }
    }

    /// The staged bytes. Reads the file for disk-backed uploads.
    pub async fn read_bytes(&self) -> std::io::Result<Bytes> {
        match &self.source {
            StagedSource::Disk(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            StagedSource::Memory(data) => Ok(data.clone()),
        }
    }

    /// Delete the staged file. Failures are logged, never returned.
    pub fn release(self) {
        match self.source {
            StagedSource::Disk(path) => {
                let shown = path.to_path_buf();
                match path.close() {
                    Ok(()) => {
                        tracing::debug!(kind = %self.kind, path = %shown.display(), "Staged upload removed");
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            kind = %self.kind,
                            path = %shown.display(),
                            "Failed to remove staged upload"
                        );
                    }
                }
            }
            StagedSource::Memory(_) => {}
        }
    }
}

/// Creates staged files in one directory.
#[derive(Debug, Clone)]
pub struct UploadStager {
    dir: PathBuf,
}

impl UploadStager {
    /// `None` stages in the OS temp directory. The directory is created if
    /// missing.
    pub fn new(dir: Option<PathBuf>) -> Result<Self, StagingError> {
        let dir = dir.unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open a new staged file. `limit` caps the number of bytes accepted.
    pub fn create_file(
        &self,
        kind: UploadKind,
        file_name: Option<String>,
        content_type: Option<String>,
        limit: Option<u64>,
    ) -> Result<StagingFile, StagingError> {
        let suffix = file_name
            .as_deref()
            .and_then(extension_of)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let named = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (file, path) = named.into_parts();

        tracing::debug!(kind = %kind, path = %path.display(), "Staging upload to disk");

        Ok(StagingFile {
            file: tokio::fs::File::from_std(file),
            path,
            kind,
            file_name,
            content_type,
            written: 0,
            limit,
        })
    }
}

/// A staged file being written. Dropping it removes the file.
pub struct StagingFile {
    file: tokio::fs::File,
    path: TempPath,
    kind: UploadKind,
    file_name: Option<String>,
    content_type: Option<String>,
    written: u64,
    limit: Option<u64>,
}

impl StagingFile {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StagingError> {
        let written = self.written + chunk.len() as u64;
        if let Some(limit) = self.limit {
            if written > limit {
                return Err(StagingError::TooLarge { limit });
            }
        }
        self.file.write_all(chunk).await?;
        self.written = written;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub async fn finish(mut self) -> Result<StagedUpload, StagingError> {
        self.file.flush().await?;
        drop(self.file);

        Ok(StagedUpload {
            source: StagedSource::Disk(self.path),
            kind: self.kind,
            file_name: self.file_name,
            content_type: self.content_type,
            size: self.written,
        })
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}
