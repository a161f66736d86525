//! File API Tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;

use crate::common::{body_bytes, body_json, multipart_body, TestApp};

#[tokio::test]
async fn test_upload_announces_and_download_returns_original_name() {
    let app = TestApp::new();
    let mut bob = app.connect("lobby", "bob");
    bob.join("fr").await;

    let body = multipart_body(
        &[("room", "lobby"), ("username", "alice")],
        Some(("file", "notes.txt", b"meeting at noon")),
    );
    let response = app.post_multipart("/upload_file", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uploaded = body_json(response).await;
    let file_id = uploaded["file_id"].as_str().unwrap().to_string();
    assert!(file_id.ends_with(".txt"));
    assert_eq!(uploaded["filename"], "notes.txt");
    assert_eq!(uploaded["file_url"], format!("/static/uploads/{}", file_id));

    let notice = bob.next_json().await;
    assert_eq!(notice["type"], "file");
    assert_eq!(notice["username"], "alice");
    assert_eq!(notice["file_name"], "notes.txt");
    assert_eq!(notice["file_id"], file_id.as_str());

    let response = app.get(&format!("/download_file/{}", file_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(body_bytes(response).await, b"meeting at noon".to_vec());

    let response = app.get(&format!("/static/uploads/{}", file_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_download_is_streamed_with_range_support() {
    let app = TestApp::new();
    let body = multipart_body(
        &[("room", "lobby"), ("username", "alice")],
        Some(("file", "notes.txt", b"meeting at noon")),
    );
    let uploaded = body_json(app.post_multipart("/upload_file", body).await).await;
    let file_id = uploaded["file_id"].as_str().unwrap();

    let response = app
        .send(
            Request::get(format!("/download_file/{}", file_id))
                .header("range", "bytes=0-6")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()["content-type"], "application/octet-stream");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"notes.txt\""
    );
    assert_eq!(body_bytes(response).await, b"meeting".to_vec());
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let app = TestApp::new();
    let response = app.get("/download_file/missing.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = TestApp::new();
    let body = multipart_body(&[("room", "lobby"), ("username", "alice")], None);
    let response = app.post_multipart("/upload_file", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
