use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Catalog backend types
///
/// Selected once at startup from `CATALOG_BACKEND`. Each variant maps to one
/// `Catalog` implementation in `vidhost-db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    Postgres,
    Mongo,
    Blob,
}

impl CatalogBackend {
    /// URL style used for new records when `MEDIA_URL_STYLE` is not set.
    ///
    /// The flat-file backend serves media through the proxy routes; the
    /// database backends hand out public blob URLs.
    pub fn default_url_style(&self) -> UrlStyle {
        match self {
            CatalogBackend::Blob => UrlStyle::Proxy,
            CatalogBackend::Postgres | CatalogBackend::Mongo => UrlStyle::Public,
        }
    }

    /// Video normalization used when `VIDEO_NORMALIZATION` is not set.
    pub fn default_normalization(&self) -> NormalizationMode {
        match self {
            CatalogBackend::Blob => NormalizationMode::Transcode,
            CatalogBackend::Postgres | CatalogBackend::Mongo => NormalizationMode::Passthrough,
        }
    }
}

impl FromStr for CatalogBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(CatalogBackend::Postgres),
            "mongo" | "mongodb" => Ok(CatalogBackend::Mongo),
            "blob" | "file" => Ok(CatalogBackend::Blob),
            _ => Err(anyhow::anyhow!("Invalid catalog backend: {}", s)),
        }
    }
}

impl Display for CatalogBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CatalogBackend::Postgres => write!(f, "postgres"),
            CatalogBackend::Mongo => write!(f, "mongo"),
            CatalogBackend::Blob => write!(f, "blob"),
        }
    }
}

/// How media locators are written into catalog records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    /// `<S3_PUBLIC_URL>/<key>`
    Public,
    /// Same-origin proxy path, e.g. `/api/videos/<name>`
    Proxy,
}

impl FromStr for UrlStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(UrlStyle::Public),
            "proxy" => Ok(UrlStyle::Proxy),
            _ => Err(anyhow::anyhow!("Invalid media URL style: {}", s)),
        }
    }
}

/// Whether uploaded videos are re-encoded before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationMode {
    Passthrough,
    Transcode,
}

impl FromStr for NormalizationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passthrough" | "none" => Ok(NormalizationMode::Passthrough),
            "transcode" => Ok(NormalizationMode::Transcode),
            _ => Err(anyhow::anyhow!("Invalid video normalization mode: {}", s)),
        }
    }
}
