//! Voice API Tests

use axum::http::StatusCode;
use base64::Engine;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, multipart_body, TestApp};

fn spoken(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(text.as_bytes())
}

#[tokio::test]
async fn test_voice_message_is_spoken_to_each_language() {
    let app = TestApp::with_transcript("good morning");
    let mut alice = app.connect("lobby", "alice");
    alice.join("en").await;
    let mut bob = app.connect("lobby", "bob");
    bob.join("fr").await;

    let body = multipart_body(
        &[
            ("room", "lobby"),
            ("username", "carol"),
            ("preferred_language", "en"),
        ],
        Some(("audio", "clip.webm", b"\x1a\x45\xdf\xa3")),
    );
    let response = app.post_multipart("/voice_message", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));

    let to_alice = alice.next_json().await;
    assert_eq!(to_alice["username"], "carol");
    assert_eq!(to_alice["content"], "good morning");
    assert_eq!(to_alice["audio_base64"], spoken("good morning"));
    assert!(to_alice.get("id").is_none());

    let to_bob = bob.next_json().await;
    assert_eq!(to_bob["content"], "[fr] good morning");
    assert_eq!(to_bob["original_content"], "good morning");
    assert_eq!(to_bob["original_language"], "en");
    assert_eq!(to_bob["audio_base64"], spoken("[fr] good morning"));

    // Voice messages stay out of history
    assert_eq!(body_json(app.get("/history/lobby").await).await, json!([]));
}

#[tokio::test]
async fn test_voice_message_requires_room() {
    let app = TestApp::new();
    let body = multipart_body(
        &[("username", "carol")],
        Some(("audio", "clip.webm", b"\x00")),
    );
    let response = app.post_multipart("/voice_message", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_voice_translate_round_trip() {
    let app = TestApp::with_transcript("namaste");
    let body = multipart_body(
        &[("source_lang", "hi"), ("target_lang", "fr")],
        Some(("audio_file", "clip.wav", b"RIFF")),
    );
    let response = app.post_multipart("/voice-translate", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["translated_text"], "[fr] namaste");
    assert_eq!(json["audio_base64"], spoken("[fr] namaste"));
}
