//! Common Test Utilities
//!
//! Fake backends, an in-memory application, and an in-process WebSocket client.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ws::Message,
    http::{Request, StatusCode},
    Router,
};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use babel_chat::config::Settings;
use babel_chat::domain::{
    AudioClip, LanguageCode, SpeechError, SpeechService, SupportedLanguage, TranslationError,
    TranslationService,
};
use babel_chat::infrastructure::repositories::InMemoryMessageRepository;
use babel_chat::presentation::http::routes;
use babel_chat::presentation::websocket::{run_connection, CloseReason};
use babel_chat::startup::AppState;

pub const BOUNDARY: &str = "babel-test-boundary";

/// Translates to `[dest] text` and detects everything as English.
#[derive(Default)]
pub struct FakeTranslator {
    pub translations: AtomicUsize,
    pub detections: AtomicUsize,
}

impl FakeTranslator {
    pub fn translation_calls(&self) -> usize {
        self.translations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationService for FakeTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Option<LanguageCode>,
        dest: &LanguageCode,
    ) -> Result<String, TranslationError> {
        self.translations.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}] {}", dest, text))
    }

    async fn detect(&self, _text: &str) -> Result<LanguageCode, TranslationError> {
        self.detections.fetch_add(1, Ordering::SeqCst);
        Ok(LanguageCode::new("en"))
    }

    async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>, TranslationError> {
        Ok(vec![
            SupportedLanguage {
                code: "en".into(),
                name: "English".into(),
            },
            SupportedLanguage {
                code: "fr".into(),
                name: "French".into(),
            },
        ])
    }
}

/// Hears a fixed transcript and "speaks" text as its UTF-8 bytes.
pub struct FakeSpeech {
    pub transcript: String,
}

#[async_trait]
impl SpeechService for FakeSpeech {
    async fn transcribe(
        &self,
        _clip: &AudioClip,
        _language: &LanguageCode,
    ) -> Result<String, SpeechError> {
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, text: &str, _language: &LanguageCode) -> Result<Vec<u8>, SpeechError> {
        Ok(text.as_bytes().to_vec())
    }
}

/// Test application backed by the in-memory store and fake backends.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub translator: Arc<FakeTranslator>,
    _storage: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_transcript("hello from the mic")
    }

    pub fn with_transcript(transcript: &str) -> Self {
        let storage = tempfile::tempdir().unwrap();
        let mut settings = Settings::defaults().unwrap();
        settings.storage.static_dir = storage.path().to_path_buf();
        settings.storage.upload_dir = storage.path().join("uploads");
        settings.websocket.close_grace_ms = 500;

        let translator = Arc::new(FakeTranslator::default());
        let speech = Arc::new(FakeSpeech {
            transcript: transcript.to_string(),
        });
        let state = AppState::new(
            settings,
            Arc::new(InMemoryMessageRepository::new()),
            translator.clone(),
            speech,
        );
        let router = routes::create_router(state.clone());

        Self {
            state,
            router,
            translator,
            _storage: storage,
        }
    }

    pub async fn get(&self, uri: &str) -> axum::response::Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str) -> axum::response::Response {
        self.send(Request::post(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_multipart(&self, uri: &str, body: Vec<u8>) -> axum::response::Response {
        self.send(
            Request::post(uri)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Open an in-process connection to `room` as `username`.
    pub fn connect(&self, room: &str, username: &str) -> TestClient {
        let (to_server, inbound) = unbounded::<Result<Message, Infallible>>();
        let (outbound, from_server) = unbounded::<Message>();
        let task = tokio::spawn(run_connection(
            self.state.connection_context(),
            room.to_string(),
            username.to_string(),
            inbound,
            outbound,
        ));

        TestClient {
            to_server,
            from_server,
            task,
        }
    }
}

pub struct TestClient {
    to_server: UnboundedSender<Result<Message, Infallible>>,
    from_server: UnboundedReceiver<Message>,
    task: JoinHandle<CloseReason>,
}

impl TestClient {
    pub fn send_text(&self, text: &str) {
        self.to_server
            .unbounded_send(Ok(Message::Text(text.to_string().into())))
            .unwrap();
    }

    pub fn send_json(&self, value: Value) {
        self.send_text(&value.to_string());
    }

    /// Send the init frame and wait for the join confirmation.
    pub async fn join(&mut self, language: &str) {
        self.send_json(serde_json::json!({ "preferred_language": language }));
        let joined = self.next_json().await;
        assert!(
            joined["info"].as_str().unwrap().starts_with("Joined room"),
            "unexpected first frame: {}",
            joined
        );
    }

    pub async fn next_message(&mut self) -> Message {
        tokio::time::timeout(Duration::from_secs(2), self.from_server.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
    }

    pub async fn next_json(&mut self) -> Value {
        match self.next_message().await {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {:?}", other),
        }
    }

    /// Client-side hangup; returns why the server ended the connection.
    pub async fn disconnect(self) -> CloseReason {
        self.to_server
            .unbounded_send(Ok(Message::Close(None)))
            .unwrap();
        self.finished().await
    }

    pub async fn finished(self) -> CloseReason {
        tokio::time::timeout(Duration::from_secs(2), self.task)
            .await
            .expect("connection did not finish")
            .unwrap()
    }
}

/// Build a multipart body from text fields and an optional `(field, file name, bytes)`.
pub fn multipart_body(texts: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub fn assert_status(response: &axum::response::Response, status: StatusCode) {
    assert_eq!(response.status(), status);
}
