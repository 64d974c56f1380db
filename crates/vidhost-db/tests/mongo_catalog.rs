//! MongoDB catalog tests. Require Docker: `cargo test -- --ignored`.
#![cfg(feature = "catalog-mongo")]

use mongodb::bson::doc;
use testcontainers_modules::mongo::Mongo;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::testcontainers::ContainerAsync;
use vidhost_core::models::NewVideo;
use vidhost_core::{CatalogBackend, CatalogConfig};
use vidhost_db::{Catalog, MongoCatalog};

async fn setup() -> (ContainerAsync<Mongo>, MongoCatalog) {
    let node = Mongo::default().start().await.unwrap();
    let port = node.get_host_port_ipv4(27017).await.unwrap();
    let config = CatalogConfig {
        backend: CatalogBackend::Mongo,
        database_url: None,
        database_ssl: false,
        db_max_connections: 2,
        mongo_uri: Some(format!("mongodb://127.0.0.1:{}", port)),
        mongo_username: None,
        mongo_password: None,
        mongo_database: "vidhost_test".to_string(),
        blob_prefix: "catalog/".to_string(),
    };
    let catalog = MongoCatalog::connect(&config).await.unwrap();
    catalog.ensure_schema_ready().await.unwrap();
    (node, catalog)
}

fn new_video(title: &str, creator: &str) -> NewVideo {
    NewVideo {
        title: title.to_string(),
        creator: creator.to_string(),
        video_url: format!("https://cdn.example.com/videos/{}.mp4", title),
        thumbnail_url: format!("https://cdn.example.com/thumbnails/{}.png", title),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_and_list_by_creator() {
    let (_node, catalog) = setup().await;
    catalog.ensure_schema_ready().await.unwrap();

    let first = catalog.insert_video(new_video("one", "alice")).await.unwrap();
    let second = catalog.insert_video(new_video("two", "bob")).await.unwrap();
    let third = catalog.insert_video(new_video("three", "alice")).await.unwrap();
    assert!(uuid::Uuid::parse_str(&first.id).is_ok());

    let all = catalog.list_videos().await.unwrap();
    let ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![third.id.clone(), second.id, first.id.clone()]);

    let by_alice = catalog.list_videos_by_creator("alice").await.unwrap();
    assert_eq!(by_alice, vec![third, first]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_find_user_by_credentials() {
    let (_node, catalog) = setup().await;
    catalog
        .database()
        .collection::<mongodb::bson::Document>("users")
        .insert_one(doc! { "username": "alice", "password": "wonderland", "displayName": "Alice" })
        .await
        .unwrap();

    let user = catalog
        .find_user_by_credentials("alice", "wonderland")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.display_name, "Alice");
    assert!(catalog
        .find_user_by_credentials("alice", "Wonderland")
        .await
        .unwrap()
        .is_none());

    catalog.ping().await.unwrap();
    catalog.close().await;
}
