use crate::catalog::{Catalog, CatalogError, CatalogResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::{ClientOptions, Credential, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;
use vidhost_core::models::{NewVideo, UserRecord, VideoRecord};
use vidhost_core::{CatalogBackend, CatalogConfig};

/// Server selection and connect timeout for every Mongo operation.
pub const MONGO_TIMEOUT: Duration = Duration::from_secs(10);

const VIDEOS: &str = "videos";
const USERS: &str = "users";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    object_id: Option<ObjectId>,
    id: String,
    title: String,
    creator: String,
    video_url: String,
    thumbnail_url: String,
    uploaded_at: BsonDateTime,
}

impl VideoDocument {
    fn into_record(self) -> CatalogResult<VideoRecord> {
        let millis = self.uploaded_at.timestamp_millis();
        let uploaded_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            CatalogError::Corrupt(format!("video {} has an invalid uploadedAt", self.id))
        })?;
        Ok(VideoRecord {
            id: self.id,
            title: self.title,
            creator: self.creator,
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            uploaded_at,
        })
    }
}

/// Document catalog backed by MongoDB
#[derive(Clone)]
pub struct MongoCatalog {
    client: Client,
    db: Database,
}

impl MongoCatalog {
    pub async fn connect(config: &CatalogConfig) -> CatalogResult<Self> {
        let uri = config
            .mongo_uri
            .as_deref()
            .ok_or_else(|| CatalogError::Config("MONGO_URI not configured".to_string()))?;

        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| CatalogError::Config(e.to_string()))?;
        options.app_name = Some("vidhost".to_string());
        options.server_selection_timeout = Some(MONGO_TIMEOUT);
        options.connect_timeout = Some(MONGO_TIMEOUT);

        if let (Some(username), Some(password)) = (&config.mongo_username, &config.mongo_password) {
            options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }

        let client =
            Client::with_options(options).map_err(|e| CatalogError::Connection(e.to_string()))?;
        let db = client.database(&config.mongo_database);

        tracing::info!(database = %config.mongo_database, "MongoDB client configured");

        Ok(Self { client, db })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn videos(&self) -> Collection<VideoDocument> {
        self.db.collection(VIDEOS)
    }

    fn users(&self) -> Collection<UserRecord> {
        self.db.collection(USERS)
    }

    async fn find_videos(&self, filter: mongodb::bson::Document) -> CatalogResult<Vec<VideoRecord>> {
        let cursor = self
            .videos()
            .find(filter)
            .sort(doc! { "uploadedAt": -1, "_id": -1 })
            .await?;
        let docs: Vec<VideoDocument> = cursor.try_collect().await?;
        docs.into_iter().map(VideoDocument::into_record).collect()
    }
}

#[async_trait]
impl Catalog for MongoCatalog {
    async fn ensure_schema_ready(&self) -> CatalogResult<()> {
        let videos = self.videos();
        videos
            .create_index(IndexModel::builder().keys(doc! { "creator": 1 }).build())
            .await?;
        videos
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "uploadedAt": -1, "_id": -1 })
                    .build(),
            )
            .await?;
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;

        tracing::info!("MongoDB indexes ensured");
        Ok(())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert"))]
    async fn insert_video(&self, video: NewVideo) -> CatalogResult<VideoRecord> {
        let document = VideoDocument {
            object_id: None,
            id: Uuid::new_v4().to_string(),
            title: video.title,
            creator: video.creator,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            uploaded_at: BsonDateTime::from_millis(Utc::now().timestamp_millis()),
        };

        self.videos().insert_one(&document).await?;
        document.into_record()
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos(&self) -> CatalogResult<Vec<VideoRecord>> {
        self.find_videos(doc! {}).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_by_creator(&self, creator: &str) -> CatalogResult<Vec<VideoRecord>> {
        self.find_videos(doc! { "creator": creator }).await
    }

    #[tracing::instrument(skip(self, password), fields(db.table = "users", db.operation = "select"))]
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> CatalogResult<Option<UserRecord>> {
        let user = self
            .users()
            .find_one(doc! { "username": username, "password": password })
            .await?;
        Ok(user)
    }

    async fn ping(&self) -> CatalogResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client shut down");
    }

    fn backend(&self) -> CatalogBackend {
        CatalogBackend::Mongo
    }
}
