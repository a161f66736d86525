//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_health_check_reports_counts() {
    let app = TestApp::new();
    let mut client = app.connect("lobby", "alice");
    client.join("en").await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["rooms"], 1);
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();
    let response = app.get("/health/live").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "alive");
}

#[tokio::test]
async fn test_readiness_with_in_memory_store() {
    let app = TestApp::new();
    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["message_store"]["message"], "in-memory");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new();
    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_supported_languages() {
    let app = TestApp::new();
    let response = app.get("/supported_languages").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "en": "English", "fr": "French" })
    );
}
