//! Room Relay Tests
//!
//! Drive full connections through `run_connection` with in-process streams.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::extract::ws::Message;
use futures::channel::mpsc::unbounded;
use futures::Sink;
use pretty_assertions::assert_eq;
use serde_json::json;

use babel_chat::presentation::websocket::{run_connection, CloseReason, OutboundEvent};

use crate::common::TestApp;

#[tokio::test]
async fn test_chat_is_translated_once_per_language() {
    let app = TestApp::new();
    let mut alice = app.connect("lobby", "alice");
    alice.join("en").await;
    let mut bob = app.connect("lobby", "bob");
    bob.join("fr").await;
    let mut claire = app.connect("lobby", "claire");
    claire.join("fr").await;

    alice.send_json(json!({ "content": "hello" }));

    let to_alice = alice.next_json().await;
    assert_eq!(to_alice["content"], "hello");
    assert_eq!(to_alice["username"], "alice");
    assert_eq!(to_alice["detected_language"], "en");

    for client in [&mut bob, &mut claire] {
        let received = client.next_json().await;
        assert_eq!(received["content"], "[fr] hello");
        assert_eq!(received["original_content"], "hello");
        assert_eq!(received["original_language"], "en");
        assert_eq!(received["id"], to_alice["id"]);
    }

    assert_eq!(app.translator.translation_calls(), 1);
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let app = TestApp::new();
    let mut alice = app.connect("lobby", "alice");
    alice.join("en").await;
    let mut dave = app.connect("kitchen", "dave");
    dave.join("en").await;

    alice.send_json(json!({ "content": "lobby only" }));
    assert_eq!(alice.next_json().await["content"], "lobby only");

    dave.send_json(json!({ "content": "kitchen only" }));
    // The next frame dave sees is his own message, not alice's
    assert_eq!(dave.next_json().await["content"], "kitchen only");
}

#[tokio::test]
async fn test_camel_case_init_and_language_update() {
    let app = TestApp::new();
    let mut bob = app.connect("lobby", "bob");
    bob.send_json(json!({ "preferredLanguage": "FR" }));
    assert_eq!(
        bob.next_json().await["info"],
        "Joined room lobby as bob with language fr"
    );

    bob.send_json(json!({ "type": "update_language", "preferred_language": "de" }));
    assert_eq!(bob.next_json().await["info"], "Language updated to de");

    bob.send_json(json!({ "content": "hallo" }));
    assert_eq!(bob.next_json().await["content"], "[de] hallo");
}

#[tokio::test]
async fn test_invalid_init_is_answered_then_closed() {
    let app = TestApp::new();
    let mut client = app.connect("lobby", "mallory");
    client.send_text("not json");

    assert_eq!(
        client.next_json().await,
        json!({ "error": "Invalid initialization data" })
    );
    assert!(matches!(client.next_message().await, Message::Close(_)));
    assert_eq!(client.finished().await, CloseReason::InvalidInit);

    assert_eq!(app.state.registry.session_count(), 0);
    assert_eq!(app.state.registry.room_count(), 0);
}

#[tokio::test]
async fn test_chat_without_content_closes_connection() {
    let app = TestApp::new();
    let mut client = app.connect("lobby", "mallory");
    client.join("en").await;

    client.send_json(json!({ "text": "wrong key" }));
    assert_eq!(
        client.next_json().await,
        json!({ "error": "Invalid message data" })
    );
    assert!(matches!(client.next_message().await, Message::Close(_)));
    assert_eq!(client.finished().await, CloseReason::InvalidMessage);
}

#[tokio::test]
async fn test_disconnect_leaves_room() {
    let app = TestApp::new();
    let mut alice = app.connect("lobby", "alice");
    alice.join("en").await;
    let mut bob = app.connect("lobby", "bob");
    bob.join("en").await;
    assert_eq!(app.state.registry.session_count(), 2);

    assert_eq!(bob.disconnect().await, CloseReason::Disconnected);
    assert_eq!(app.state.registry.session_count(), 1);

    alice.send_json(json!({ "content": "anyone?" }));
    assert_eq!(alice.next_json().await["content"], "anyone?");

    assert_eq!(alice.disconnect().await, CloseReason::Disconnected);
    assert_eq!(app.state.registry.room_count(), 0);
}

/// A socket whose every write fails.
struct BrokenSocket;

impl Sink<Message> for BrokenSocket {
    type Error = String;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
        Err("broken pipe".to_string())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_write_failure_disconnects_and_unregisters() {
    let app = TestApp::new();
    let (to_server, inbound) = unbounded::<Result<Message, Infallible>>();
    let task = tokio::spawn(run_connection(
        app.state.connection_context(),
        "lobby".to_string(),
        "alice".to_string(),
        inbound,
        BrokenSocket,
    ));

    // The join reply is the first write and it fails; the inbound side stays open
    to_server
        .unbounded_send(Ok(Message::Text(
            json!({ "preferred_language": "en" }).to_string().into(),
        )))
        .unwrap();

    let reason = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("connection should end after a failed write")
        .unwrap();
    assert_eq!(reason, CloseReason::Terminated);
    assert_eq!(app.state.registry.session_count(), 0);

    let report = app
        .state
        .engine
        .broadcast_notice("lobby", OutboundEvent::info("x"))
        .await;
    assert_eq!(report.recipients, 0);
    drop(to_server);
}
