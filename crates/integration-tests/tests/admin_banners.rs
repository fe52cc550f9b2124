//! Integration tests for banner management (records plus blob images).

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use taskmaster_admin::fake::FakeBlobStore;
use taskmaster_integration_tests::{FilePart, TestApp, multipart_body};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn png(file_name: &str) -> Option<FilePart<'_>> {
    Some(FilePart {
        file_name,
        content_type: "image/png",
        bytes: PNG,
    })
}

fn existing_banner() -> Value {
    json!({
        "banners": {
            "bn1": {
                "id": "bn1",
                "title": "Spring sale",
                "description": "20% off",
                "imageUrl": FakeBlobStore::download_url("banners/1700000000000_spring.png"),
                "imagePath": "banners/1700000000000_spring.png",
                "active": true,
                "createdAt": 1_700_000_000_000_i64
            }
        }
    })
}

async fn seeded_app() -> TestApp {
    let app = TestApp::signed_in(existing_banner()).await;
    app.fakes
        .blobs
        .insert("banners/1700000000000_spring.png", PNG);
    app
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_banner_uploads_image_and_writes_record() {
    let app = TestApp::signed_in(json!({})).await;
    let body = multipart_body(
        &[("title", "  Winter deals "), ("link", "https://taskmaster.app/deals")],
        png("winter.png"),
    );

    let response = app.multipart(Method::POST, "/api/banners", body).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let key = response.body["key"].as_str().unwrap().to_string();
    assert_eq!(response.body["id"], json!(key));
    assert_eq!(response.body["title"], json!("Winter deals"));
    assert_eq!(response.body["active"], json!(true));
    assert!(response.body.get("description").is_none());

    let path = response.body["imagePath"].as_str().unwrap();
    assert!(path.starts_with("banner_images/"));
    assert!(path.ends_with("winter.png"));
    assert_eq!(app.fakes.blobs.get(path).unwrap().bytes, PNG);
    assert_eq!(
        response.body["imageUrl"],
        json!(FakeBlobStore::download_url(path))
    );

    let stored = app.fakes.store.snapshot(&format!("banners/{key}")).unwrap();
    assert_eq!(stored["title"], json!("Winter deals"));
    assert_eq!(stored["link"], json!("https://taskmaster.app/deals"));
}

#[tokio::test]
async fn test_create_banner_requires_image() {
    let app = TestApp::signed_in(json!({})).await;
    let body = multipart_body(&[("title", "No picture")], None);

    let response = app.multipart(Method::POST, "/api/banners", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), Some("Image is required"));
    assert!(app.fakes.blobs.paths().is_empty());
}

#[tokio::test]
async fn test_create_banner_requires_title() {
    let app = TestApp::signed_in(json!({})).await;
    let body = multipart_body(&[("title", "   ")], png("a.png"));

    let response = app.multipart(Method::POST, "/api/banners", body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.fakes.blobs.paths().is_empty());
}

#[tokio::test]
async fn test_create_banner_record_failure_discards_upload() {
    let app = TestApp::signed_in(json!({})).await;
    app.fakes.store.fail_writes(true);
    let body = multipart_body(&[("title", "Doomed")], png("doomed.png"));

    let response = app.multipart(Method::POST, "/api/banners", body).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(app.fakes.blobs.paths().is_empty());
}

// =============================================================================
// Update / Toggle
// =============================================================================

#[tokio::test]
async fn test_update_banner_replaces_image_and_keeps_identity() {
    let app = seeded_app().await;
    let body = multipart_body(
        &[("title", "Summer sale"), ("description", "")],
        png("summer.png"),
    );

    let response = app.multipart(Method::PUT, "/api/banners/bn1", body).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], json!("bn1"));
    assert_eq!(response.body["title"], json!("Summer sale"));
    assert_eq!(response.body["createdAt"], json!(1_700_000_000_000_i64));
    assert!(response.body.get("description").is_none());

    let new_path = response.body["imagePath"].as_str().unwrap();
    assert!(app.fakes.blobs.contains(new_path));
    assert!(!app.fakes.blobs.contains("banners/1700000000000_spring.png"));
}

#[tokio::test]
async fn test_update_banner_without_image_keeps_blob() {
    let app = seeded_app().await;
    let body = multipart_body(&[("title", "Spring sale!"), ("active", "off")], None);

    let response = app.multipart(Method::PUT, "/api/banners/bn1", body).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["active"], json!(false));
    assert_eq!(
        response.body["imagePath"],
        json!("banners/1700000000000_spring.png")
    );
    assert!(app.fakes.blobs.contains("banners/1700000000000_spring.png"));
    assert_eq!(app.fakes.blobs.deletes(), 0);
}

#[tokio::test]
async fn test_update_unknown_banner() {
    let app = seeded_app().await;
    let body = multipart_body(&[("title", "Ghost")], png("ghost.png"));

    let response = app.multipart(Method::PUT, "/api/banners/nope", body).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.fakes.blobs.paths().len(), 1);
}

#[tokio::test]
async fn test_toggle_banner() {
    let app = seeded_app().await;

    let first = app.call(Method::POST, "/api/banners/bn1/toggle").await;
    assert_eq!(first.body["active"], json!(false));
    assert_eq!(
        app.fakes.store.snapshot("banners/bn1/active"),
        Some(json!(false))
    );

    let second = app.call(Method::POST, "/api/banners/bn1/toggle").await;
    assert_eq!(second.body["active"], json!(true));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_banner_removes_blob_and_record() {
    let app = seeded_app().await;

    let response = app.call(Method::DELETE, "/api/banners/bn1").await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(app.fakes.blobs.paths().is_empty());
    assert_eq!(app.fakes.store.snapshot("banners/bn1"), None);
    assert_eq!(app.get("/api/banners").await.body["total"], json!(0));
}

#[tokio::test]
async fn test_delete_banner_blob_failure_keeps_record() {
    let app = seeded_app().await;
    app.fakes.blobs.fail_deletes(true);

    let response = app.call(Method::DELETE, "/api/banners/bn1").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.error(), Some("Failed to delete banner"));
    assert!(app.fakes.store.snapshot("banners/bn1").is_some());
    assert!(app.fakes.blobs.contains("banners/1700000000000_spring.png"));

    let listing = app.get("/api/banners").await;
    assert_eq!(listing.body["items"][0]["key"], json!("bn1"));
}

#[tokio::test]
async fn test_delete_legacy_banner_resolves_path_from_url() {
    let app = TestApp::signed_in(json!({
        "banners": {
            "old": {
                "title": "Legacy",
                "imageUrl": FakeBlobStore::download_url("banners/legacy.jpg")
            }
        }
    }))
    .await;
    app.fakes.blobs.insert("banners/legacy.jpg", PNG);

    let response = app.call(Method::DELETE, "/api/banners/old").await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(!app.fakes.blobs.contains("banners/legacy.jpg"));
}
