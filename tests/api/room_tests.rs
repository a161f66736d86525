//! Room API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_history_of_unknown_room_is_empty() {
    let app = TestApp::new();
    let response = app.get("/history/nowhere").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_history_lists_original_messages_in_order() {
    let app = TestApp::new();
    let mut alice = app.connect("lobby", "alice");
    alice.join("fr").await;

    alice.send_json(json!({ "content": "first" }));
    alice.next_json().await;
    alice.send_json(json!({ "content": "second" }));
    alice.next_json().await;

    let history = body_json(app.get("/history/lobby").await).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["content"], "first");
    assert_eq!(history[1]["content"], "second");
    assert_eq!(history[0]["username"], "alice");
    assert!(history[0]["id"].as_i64().unwrap() < history[1]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn test_create_room_resets_history() {
    let app = TestApp::new();
    let mut alice = app.connect("lobby", "alice");
    alice.join("en").await;
    alice.send_json(json!({ "content": "old news" }));
    alice.next_json().await;

    let response = app.post("/create-room/lobby").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Room 'lobby' created/reset." })
    );

    assert_eq!(body_json(app.get("/history/lobby").await).await, json!([]));

    // Live members are not affected by a reset
    alice.send_json(json!({ "content": "still here" }));
    assert_eq!(alice.next_json().await["content"], "still here");
}
