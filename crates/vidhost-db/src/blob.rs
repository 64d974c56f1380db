use crate::catalog::{newest_first, Catalog, CatalogResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use vidhost_core::models::{NewVideo, UserRecord, VideoRecord};
use vidhost_core::CatalogBackend;
use vidhost_storage::{BlobStore, StorageError};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Flat-file catalog: `videos.json` and `users.json` arrays in the blob store.
///
/// `insert_video` reads the whole array, appends, and writes it back. Two
/// concurrent inserts can lose one of the records; this backend is meant for
/// single-writer deployments.
#[derive(Clone)]
pub struct BlobCatalog {
    store: Arc<dyn BlobStore>,
    videos_key: String,
    users_key: String,
}

impl BlobCatalog {
    pub fn new(store: Arc<dyn BlobStore>, prefix: &str) -> Self {
        let prefix = match prefix.trim_matches('/') {
            "" => String::new(),
            p => format!("{}/", p),
        };
        Self {
            store,
            videos_key: format!("{}videos.json", prefix),
            users_key: format!("{}users.json", prefix),
        }
    }

    pub fn videos_key(&self) -> &str {
        &self.videos_key
    }

    pub fn users_key(&self) -> &str {
        &self.users_key
    }

    /// A missing file reads as an empty array.
    async fn read_array<T: DeserializeOwned>(&self, key: &str) -> CatalogResult<Vec<T>> {
        match self.store.get(key).await {
            Ok(object) => {
                let bytes = object.bytes().await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            Err(StorageError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_array<T: Serialize>(&self, key: &str, items: &[T]) -> CatalogResult<()> {
        let body = serde_json::to_vec_pretty(items)?;
        self.store
            .put(key, Bytes::from(body), JSON_CONTENT_TYPE)
            .await?;
        Ok(())
    }

    fn new_id() -> String {
        format!(
            "{}-{:08x}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().as_u128() as u32
        )
    }
}

#[async_trait]
impl Catalog for BlobCatalog {
    async fn ensure_schema_ready(&self) -> CatalogResult<()> {
        if !self.store.exists(&self.videos_key).await? {
            self.write_array::<VideoRecord>(&self.videos_key, &[]).await?;
            tracing::info!(key = %self.videos_key, "Created empty video catalog");
        }
        if !self.store.exists(&self.users_key).await? {
            self.write_array::<UserRecord>(&self.users_key, &[]).await?;
            tracing::info!(key = %self.users_key, "Created empty user catalog");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos.json", db.operation = "insert"))]
    async fn insert_video(&self, video: NewVideo) -> CatalogResult<VideoRecord> {
        let mut records: Vec<VideoRecord> = self.read_array(&self.videos_key).await?;
        let record = video.into_record(Self::new_id(), Utc::now());
        records.push(record.clone());
        self.write_array(&self.videos_key, &records).await?;

        tracing::debug!(id = %record.id, total = records.len(), "Video appended to catalog file");
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos.json", db.operation = "select"))]
    async fn list_videos(&self) -> CatalogResult<Vec<VideoRecord>> {
        let records: Vec<VideoRecord> = self.read_array(&self.videos_key).await?;
        Ok(newest_first(records))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos.json", db.operation = "select"))]
    async fn list_videos_by_creator(&self, creator: &str) -> CatalogResult<Vec<VideoRecord>> {
        let records: Vec<VideoRecord> = self.read_array(&self.videos_key).await?;
        Ok(newest_first(
            records.into_iter().filter(|r| r.creator == creator).collect(),
        ))
    }

    #[tracing::instrument(skip(self, password), fields(db.table = "users.json", db.operation = "select"))]
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> CatalogResult<Option<UserRecord>> {
        let users: Vec<UserRecord> = self.read_array(&self.users_key).await?;
        Ok(users
            .into_iter()
            .find(|u| u.username == username && u.password == password))
    }

    async fn ping(&self) -> CatalogResult<()> {
        self.store.exists(&self.videos_key).await?;
        Ok(())
    }

    fn backend(&self) -> CatalogBackend {
        CatalogBackend::Blob
    }
}
