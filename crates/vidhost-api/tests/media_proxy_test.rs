mod helpers;

use axum::http::StatusCode;
use bytes::Bytes;
use helpers::{png_fixture, TestApp};
use vidhost_storage::BlobStore;

#[tokio::test]
async fn test_thumbnail_proxy_streams_with_headers() {
    let app = TestApp::new().await;
    let png = png_fixture(8, 8);
    app.store
        .put("thumbnails/123-abc.png", png.clone(), "image/png")
        .await
        .unwrap();

    let response = app.server.get("/api/thumbnails/123-abc.png").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.header("cross-origin-resource-policy"), "cross-origin");
    assert_eq!(response.as_bytes(), &png);
}

#[tokio::test]
async fn test_video_proxy_forwards_stored_content_type() {
    let app = TestApp::new().await;
    app.store
        .put(
            "videos/123-abc.webm",
            Bytes::from_static(b"webm-bytes"),
            "video/webm",
        )
        .await
        .unwrap();

    let response = app.server.get("/api/videos/123-abc.webm").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "video/webm");
    assert_eq!(response.header("content-length"), "10");
    assert_eq!(response.as_bytes().as_ref(), b"webm-bytes");
}

#[tokio::test]
async fn test_missing_media_is_not_found() {
    let app = TestApp::new().await;

    app.server
        .get("/api/videos/nope.mp4")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/api/thumbnails/nope.png")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_proxy_rejects_traversal_names() {
    let app = TestApp::new().await;
    app.store
        .put("catalog/secret.json", Bytes::from_static(b"[]"), "application/json")
        .await
        .unwrap();

    let response = app.server.get("/api/videos/..%2Fcatalog%2Fsecret.json").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app.server.get("/api/thumbnails/..hidden.png").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_readiness_reports_dependencies() {
    let app = TestApp::new().await;

    let response = app.server.get("/health/ready").await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["catalog"], "ready");
    assert_eq!(body["catalog_backend"], "blob");
    assert_eq!(body["storage"], "ready");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/openapi.json").await;
    response.assert_status_ok();
    let body = response.json::<serde_json::Value>();
    assert!(body["paths"]["/upload_video"].is_object());
    assert!(body["paths"]["/api/videos/bycreator"].is_object());
}
