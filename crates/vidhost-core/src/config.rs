//! Configuration module
//!
//! Settings are read from the environment (with `.env` support through
//! dotenvy) into four groups: HTTP server, object store, catalog, and media
//! processing. `Config::validate` runs the cross-field checks that a plain
//! parse cannot express.

use std::env;
use std::path::PathBuf;

use crate::backend_types::{CatalogBackend, NormalizationMode, UrlStyle};

const SERVER_PORT: u16 = 3000;
const MAX_VIDEO_SIZE_MB: usize = 500;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const DB_MAX_CONNECTIONS: u32 = 10;
const S3_REGION: &str = "auto";
const MONGO_DATABASE: &str = "vidhost";
const CATALOG_BLOB_PREFIX: &str = "catalog/";
const FFMPEG_PATH: &str = "ffmpeg";

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_video_size_bytes: usize,
    pub request_timeout_secs: u64,
}

/// S3-compatible object store settings
#[derive(Clone, Debug)]
pub struct ObjectStoreConfig {
    pub account_id: Option<String>,
    /// Explicit endpoint; takes precedence over the account-derived one.
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
    pub public_url: Option<String>,
}

impl ObjectStoreConfig {
    /// Endpoint URL for the store. An account id without an explicit endpoint
    /// resolves to the Cloudflare R2 endpoint for that account.
    pub fn endpoint_url(&self) -> Option<String> {
        match (&self.endpoint, &self.account_id) {
            (Some(endpoint), _) => Some(endpoint.trim_end_matches('/').to_string()),
            (None, Some(account)) => Some(format!("https://{}.r2.cloudflarestorage.com", account)),
            (None, None) => None,
        }
    }
}

/// Catalog backend settings
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    pub database_url: Option<String>,
    pub database_ssl: bool,
    pub db_max_connections: u32,
    pub mongo_uri: Option<String>,
    pub mongo_username: Option<String>,
    pub mongo_password: Option<String>,
    pub mongo_database: String,
    pub blob_prefix: String,
}

/// Media processing settings
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub ffmpeg_path: String,
    /// `None` stages uploads in the OS temp directory.
    pub staging_dir: Option<PathBuf>,
    pub url_style: UrlStyle,
    pub normalization: NormalizationMode,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub object_store: ObjectStoreConfig,
    pub catalog: CatalogConfig,
    pub media: MediaConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("{} must be set", key))
        };

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_video_size_mb = get("MAX_VIDEO_SIZE_MB")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let base = BaseConfig {
            server_port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(SERVER_PORT),
            cors_origins,
            environment,
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            request_timeout_secs: get("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
        };

        let object_store = ObjectStoreConfig {
            account_id: get("S3_ACCOUNT_ID"),
            endpoint: get("S3_ENDPOINT"),
            access_key_id: require("S3_ACCESS_KEY_ID")?,
            secret_access_key: require("S3_SECRET_ACCESS_KEY")?,
            bucket: require("S3_BUCKET")?,
            region: get("S3_REGION").unwrap_or_else(|| S3_REGION.to_string()),
            public_url: get("S3_PUBLIC_URL").map(|u| u.trim_end_matches('/').to_string()),
        };

        let backend = match get("CATALOG_BACKEND") {
            Some(raw) => raw.parse::<CatalogBackend>()?,
            None => CatalogBackend::Postgres,
        };

        let catalog = CatalogConfig {
            backend,
            database_url: get("DATABASE_URL"),
            database_ssl: get("DATABASE_SSL")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DB_MAX_CONNECTIONS),
            mongo_uri: get("MONGO_URI"),
            mongo_username: get("MONGO_USERNAME"),
            mongo_password: get("MONGO_PASSWORD"),
            mongo_database: get("MONGO_DATABASE").unwrap_or_else(|| MONGO_DATABASE.to_string()),
            blob_prefix: get("CATALOG_BLOB_PREFIX")
                .unwrap_or_else(|| CATALOG_BLOB_PREFIX.to_string()),
        };

        let url_style = match get("MEDIA_URL_STYLE") {
            Some(raw) => raw.parse::<UrlStyle>()?,
            None => backend.default_url_style(),
        };

        let normalization = match get("VIDEO_NORMALIZATION") {
            Some(raw) => raw.parse::<NormalizationMode>()?,
            None => backend.default_normalization(),
        };

        let media = MediaConfig {
            ffmpeg_path: get("FFMPEG_PATH").unwrap_or_else(|| FFMPEG_PATH.to_string()),
            staging_dir: get("UPLOAD_STAGING_DIR").map(PathBuf::from),
            url_style,
            normalization,
        };

        Ok(Config {
            base,
            object_store,
            catalog,
            media,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.object_store.endpoint_url().is_none() {
            return Err(anyhow::anyhow!(
                "S3_ENDPOINT or S3_ACCOUNT_ID must be set to locate the object store"
            ));
        }

        if self.media.url_style == UrlStyle::Public && self.object_store.public_url.is_none() {
            return Err(anyhow::anyhow!(
                "S3_PUBLIC_URL must be set when MEDIA_URL_STYLE is public"
            ));
        }

        match self.catalog.backend {
            CatalogBackend::Postgres => match self.catalog.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when using the postgres catalog"
                    ))
                }
            },
            CatalogBackend::Mongo => match self.catalog.mongo_uri.as_deref() {
                Some(uri) if uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://") => {
                }
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "MONGO_URI must be a valid MongoDB connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "MONGO_URI must be set when using the mongo catalog"
                    ))
                }
            },
            CatalogBackend::Blob => {
                if self.catalog.blob_prefix.starts_with('/') {
                    return Err(anyhow::anyhow!(
                        "CATALOG_BLOB_PREFIX must be a relative key prefix"
                    ));
                }
            }
        }

        if self.media.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH cannot be empty"));
        }

        if self.base.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.base.max_video_size_bytes
    }
}
