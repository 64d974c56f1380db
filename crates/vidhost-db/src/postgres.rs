use crate::catalog::{Catalog, CatalogError, CatalogResult};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres};
use std::str::FromStr;
use std::time::Duration;
use vidhost_core::models::{NewVideo, UserRecord, VideoRecord};
use vidhost_core::{CatalogBackend, CatalogConfig};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

const VIDEO_COLUMNS: &str = "id::text AS id, title, creator, video_url, thumbnail_url, uploaded_at";

/// Relational catalog backed by PostgreSQL
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using `DATABASE_URL`; TLS is required when `DATABASE_SSL` is set.
    pub async fn connect(config: &CatalogConfig) -> CatalogResult<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| CatalogError::Config("DATABASE_URL not configured".to_string()))?;

        let mut options =
            PgConnectOptions::from_str(url).map_err(|e| CatalogError::Config(e.to_string()))?;
        if config.database_ssl {
            options = options.ssl_mode(PgSslMode::Require);
        }

        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect_with(options)
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        tracing::info!(
            max_connections = config.db_max_connections,
            ssl = config.database_ssl,
            "Database connected successfully"
        );

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn ensure_schema_ready(&self) -> CatalogResult<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| CatalogError::Query(format!("Failed to run database migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert"))]
    async fn insert_video(&self, video: NewVideo) -> CatalogResult<VideoRecord> {
        let query = format!(
            "INSERT INTO videos (title, creator, video_url, thumbnail_url) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            VIDEO_COLUMNS
        );
        let record = sqlx::query_as::<Postgres, VideoRecord>(&query)
            .bind(&video.title)
            .bind(&video.creator)
            .bind(&video.video_url)
            .bind(&video.thumbnail_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos(&self) -> CatalogResult<Vec<VideoRecord>> {
        let query = format!(
            "SELECT {} FROM videos ORDER BY uploaded_at DESC, videos.id DESC",
            VIDEO_COLUMNS
        );
        let records = sqlx::query_as::<Postgres, VideoRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_by_creator(&self, creator: &str) -> CatalogResult<Vec<VideoRecord>> {
        let query = format!(
            "SELECT {} FROM videos WHERE creator = $1 ORDER BY uploaded_at DESC, videos.id DESC",
            VIDEO_COLUMNS
        );
        let records = sqlx::query_as::<Postgres, VideoRecord>(&query)
            .bind(creator)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self, password), fields(db.table = "users", db.operation = "select"))]
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> CatalogResult<Option<UserRecord>> {
        let user = sqlx::query_as::<Postgres, UserRecord>(
            "SELECT username, password, display_name FROM users WHERE username = $1 AND password = $2",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn ping(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }

    fn backend(&self) -> CatalogBackend {
        CatalogBackend::Postgres
    }
}
