//! Integration tests for the catalog onboarding workflow: payload
//! staging, asset bundle export, and commit.

mod common;

use std::io::{Cursor, Read, Write};

use axum::http::{header, StatusCode};
use carte_core::store::CatalogStore;
use common::{
    body_bytes, body_json, expect_error, get_auth, post_multipart, spawn_app, token_for,
};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const PAYLOAD: &str = r#"[
    {"type": "restaurant", "id": "R-1", "name": "Cafe", "ownerEmailAddress": "o@x.com"},
    {"type": "menuItem", "id": "M-1", "title": "Tea", "price": 2.50, "restaurantId": "R-1"}
]"#;

fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut archive = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut archive));
        let options = SimpleFileOptions::default();
        for (path, contents) in entries {
            zip.start_file(*path, options).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }
    archive
}

// ---------------------------------------------------------------------------
// Test: all import endpoints require authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_endpoints_require_authentication() {
    let test_app = spawn_app();

    for uri in ["/api/v1/import", "/api/v1/import/bundle"] {
        let response = common::get(test_app.app.clone(), uri).await;
        let json = expect_error(response, StatusCode::UNAUTHORIZED).await;
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}

// ---------------------------------------------------------------------------
// Test: uploading a payload stages parsed, linked, pending entities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_payload_stages_linked_pending_entities() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    let response = post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        PAYLOAD.as_bytes(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    // Parents come first, everything starts pending and unpersisted.
    assert_eq!(data[0]["kind"], "restaurant");
    assert_eq!(data[0]["name"], "Cafe");
    assert_eq!(data[0]["status"], "pending");
    assert!(data[0]["id"].is_null());

    assert_eq!(data[1]["kind"], "menuItem");
    assert_eq!(data[1]["title"], "Tea");
    assert_eq!(data[1]["status"], "pending");
    assert_eq!(data[1]["restaurant"]["name"], "Cafe");

    // The staged batch is retrievable.
    let response = get_auth(test_app.app.clone(), "/api/v1/import", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Test: re-uploading replaces the staged batch wholesale
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reupload_replaces_staged_batch() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        PAYLOAD.as_bytes(),
    )
    .await;

    let smaller = r#"[{"type": "restaurant", "id": "R-2", "name": "Bistro", "ownerEmailAddress": "b@x.com"}]"#;
    post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        smaller.as_bytes(),
    )
    .await;

    let response = get_auth(test_app.app.clone(), "/api/v1/import", &token).await;
    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Bistro");
}

// ---------------------------------------------------------------------------
// Test: staged batches are scoped per caller
// ---------------------------------------------------------------------------

#[tokio::test]
async fn staging_is_isolated_per_caller() {
    let test_app = spawn_app();
    let alice = token_for(&test_app, "alice@x.com");
    let bob = token_for(&test_app, "bob@x.com");

    post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &alice,
        "payload",
        PAYLOAD.as_bytes(),
    )
    .await;

    let response = get_auth(test_app.app.clone(), "/api/v1/import", &bob).await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: malformed payload is rejected with a parse error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_payload_is_rejected() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    let response = post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        b"this is not json",
    )
    .await;

    let json = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "PARSE_ERROR");
}

// ---------------------------------------------------------------------------
// Test: upload without the payload field is a bad request
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_without_payload_field_is_rejected() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    let response = post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "wrong-field",
        PAYLOAD.as_bytes(),
    )
    .await;

    expect_error(response, StatusCode::BAD_REQUEST).await;
}

// ---------------------------------------------------------------------------
// Test: bundle download is a zip attachment with one folder per entity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bundle_download_is_zip_with_folder_per_entity() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        PAYLOAD.as_bytes(),
    )
    .await;

    let response = get_auth(test_app.app.clone(), "/api/v1/import/bundle", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/zip"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("items-images.zip"));

    let bytes = body_bytes(response).await;
    let mut zip = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert!(names.contains(&"item-R-1/default.jpg".to_string()));
    assert!(names.contains(&"item-M-1/default.jpg".to_string()));

    // The placeholder bytes are the configured fixture.
    let mut contents = Vec::new();
    zip.by_name("item-R-1/default.jpg")
        .unwrap()
        .read_to_end(&mut contents)
        .unwrap();
    assert_eq!(contents, b"placeholder-image-bytes");
}

// ---------------------------------------------------------------------------
// Test: commit with nothing staged is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn commit_with_nothing_staged_is_rejected() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    let archive = zip_of(&[("item-R-1/a.jpg", b"x")]);
    let response = post_multipart(
        test_app.app.clone(),
        "/api/v1/import/commit",
        &token,
        "archive",
        &archive,
    )
    .await;

    let json = expect_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: full onboarding round trip, partial archive
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_round_trip_commits_batch_and_matches_assets() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    // Stage the payload.
    post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        PAYLOAD.as_bytes(),
    )
    .await;

    // Download the scaffold (exercised for its side of the contract).
    let response = get_auth(test_app.app.clone(), "/api/v1/import/bundle", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Upload an archive with a real asset only for the menu item.
    let archive = zip_of(&[("item-M-1/tea.jpg", b"real-photo-bytes")]);
    let response = post_multipart(
        test_app.app.clone(),
        "/api/v1/import/commit",
        &token,
        "archive",
        &archive,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["committed"], 2);

    let entities = json["data"]["entities"].as_array().unwrap();
    let restaurant = &entities[0];
    assert_eq!(restaurant["kind"], "restaurant");
    assert!(restaurant["id"].is_number(), "durable id assigned");
    assert!(restaurant["externalId"].is_null(), "external id dropped");
    assert!(restaurant["imagePath"].is_null(), "no folder matched");
    assert_eq!(restaurant["status"], "pending");

    let item = &entities[1];
    assert_eq!(item["kind"], "menuItem");
    assert!(item["id"].is_number());
    assert_eq!(item["restaurantId"], restaurant["id"]);
    let image_path = item["imagePath"].as_str().unwrap();
    assert!(image_path.starts_with("/images/items/"));
    assert!(image_path.ends_with(".jpg"));

    // The asset bytes landed under the asset root.
    let copied: Vec<_> = std::fs::read_dir(test_app.config.asset_root.clone())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(copied.len(), 1);
    assert_eq!(std::fs::read(&copied[0]).unwrap(), b"real-photo-bytes");

    // Staging is empty after a successful commit.
    let response = get_auth(test_app.app.clone(), "/api/v1/import", &token).await;
    let json = body_json(response).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: an unreadable archive aborts the commit and keeps staging
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreadable_archive_keeps_staged_batch_for_retry() {
    let test_app = spawn_app();
    let token = token_for(&test_app, "importer@x.com");

    post_multipart(
        test_app.app.clone(),
        "/api/v1/import",
        &token,
        "payload",
        PAYLOAD.as_bytes(),
    )
    .await;

    let response = post_multipart(
        test_app.app.clone(),
        "/api/v1/import/commit",
        &token,
        "archive",
        b"definitely not a zip",
    )
    .await;
    expect_error(response, StatusCode::BAD_REQUEST).await;

    // Batch survives for a retry.
    let response = get_auth(test_app.app.clone(), "/api/v1/import", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    // Nothing was persisted durably.
    assert!(test_app.store.get_all().await.unwrap().is_empty());
}
