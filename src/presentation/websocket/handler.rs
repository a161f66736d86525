//! WebSocket Connection Handler
//!
//! Drives one connection through its lifecycle:
//!
//! ```text
//! CONNECTING ──accept──▶ AWAITING_INIT ──valid init──▶ ACTIVE ──▶ CLOSED
//!                             │                          │
//!                             └──── bad init / close ────┴──▶ CLOSED
//! ```
//!
//! The connection is generic over its frame stream and sink so it can be
//! driven without a real socket.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use validator::Validate;

use super::pipeline::{CloseReason, Flow, IngestPipeline};
use super::registry::RoomRegistry;
use super::session::Session;
use crate::domain::LanguageCode;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Path segments of `/ws/{room}/{username}`.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinPath {
    #[validate(length(min = 1, max = 128))]
    pub room: String,
    #[validate(length(min = 1, max = 128))]
    pub username: String,
}

/// Everything a connection needs besides its socket.
#[derive(Clone)]
pub struct ConnectionContext {
    pub registry: Arc<RoomRegistry>,
    pub pipeline: Arc<IngestPipeline>,
    pub outbound_buffer: usize,
    pub send_timeout: Duration,
    pub close_grace: Duration,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(path): Path<JoinPath>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    path.validate().map_err(validation_error)?;

    let ctx = state.connection_context();
    let JoinPath { room, username } = path;

    Ok(ws
        .max_message_size(state.settings.websocket.max_message_size)
        .on_upgrade(move |socket: WebSocket| async move {
            let (sink, stream) = socket.split();
            run_connection(ctx, room, username, stream, sink).await;
        }))
}

/// Run a connection to completion and return why it ended.
///
/// The session is registered on entry and unregistered on every exit path,
/// including cancellation of this future.
pub async fn run_connection<R, W, E>(
    ctx: ConnectionContext,
    room: String,
    username: String,
    inbound: R,
    outbound: W,
) -> CloseReason
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
    W: Sink<Message> + Unpin + Send + 'static,
    W::Error: Display + Send,
{
    let (session, rx) = Session::channel(
        username,
        room,
        LanguageCode::default(),
        ctx.outbound_buffer,
        ctx.send_timeout,
    );
    let session_id = session.id();

    let registration = Registration::new(ctx.registry.clone(), session.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut writer = tokio::spawn(write_loop(session.clone(), rx, outbound, shutdown_rx));

    tracing::debug!(room = %session.room(), session_id = %session_id, "New WebSocket connection");

    let reason = drive(&ctx.pipeline, &session, inbound).await;

    // Leave the room before flushing so no new broadcasts target us
    drop(registration);
    let _ = shutdown_tx.send(());
    if tokio::time::timeout(ctx.close_grace, &mut writer).await.is_err() {
        tracing::debug!(session_id = %session_id, "Writer did not finish in time, aborting");
        writer.abort();
    }

    tracing::info!(
        room = %session.room(),
        username = %session.username(),
        session_id = %session_id,
        reason = ?reason,
        "Connection closed"
    );
    reason
}

async fn drive<R, E>(pipeline: &IngestPipeline, session: &Session, mut inbound: R) -> CloseReason
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    // AWAITING_INIT
    let first = tokio::select! {
        biased;
        _ = session.terminated() => return CloseReason::Terminated,
        frame = next_payload(&mut inbound, session) => frame,
    };
    let Some(raw) = first else {
        return CloseReason::Disconnected;
    };
    if let Flow::Close(reason) = pipeline.handle_init(session, &raw).await {
        return reason;
    }

    // ACTIVE
    loop {
        let next = tokio::select! {
            biased;
            _ = session.terminated() => return CloseReason::Terminated,
            frame = next_payload(&mut inbound, session) => frame,
        };
        let Some(raw) = next else {
            return CloseReason::Disconnected;
        };
        if let Flow::Close(reason) = pipeline.handle_event(session, &raw).await {
            return reason;
        }
    }
}

/// Next data frame, or `None` once the client is gone.
async fn next_payload<R, E>(inbound: &mut R, session: &Session) -> Option<Vec<u8>>
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = inbound.next().await {
        match frame {
            Ok(Message::Text(text)) => return Some(text.as_str().as_bytes().to_vec()),
            Ok(Message::Binary(data)) => return Some(data.to_vec()),
            Ok(Message::Close(_)) => return None,
            // Pong is handled automatically by axum
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "WebSocket error");
                return None;
            }
        }
    }
    None
}

/// Forward queued frames to the socket.
///
/// On shutdown the queue is closed, whatever is still in it is flushed,
/// and a Close frame ends the conversation. A failed write terminates the
/// session so the reader side closes and unregisters it.
async fn write_loop<W>(
    session: Arc<Session>,
    mut rx: mpsc::Receiver<String>,
    mut sink: W,
    mut shutdown: oneshot::Receiver<()>,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    loop {
        tokio::select! {
            biased;
            frame = rx.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        tracing::debug!(session_id = %session.id(), error = %e, "Failed to write frame");
                        session.terminate();
                        return;
                    }
                }
                None => break,
            },
            _ = &mut shutdown => break,
        }
    }

    rx.close();
    while let Some(text) = rx.recv().await {
        if sink.send(Message::Text(text.into())).await.is_err() {
            return;
        }
    }
    let _ = sink.send(Message::Close(None)).await;
    let _ = sink.close().await;
}

/// Keeps a session in the registry for as long as it lives.
struct Registration {
    registry: Arc<RoomRegistry>,
    session: Arc<Session>,
}

impl Registration {
    fn new(registry: Arc<RoomRegistry>, session: Arc<Session>) -> Self {
        registry.register(session.clone());
        metrics::websocket_connected();
        Self { registry, session }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry
            .unregister(self.session.room(), self.session.id());
        metrics::websocket_disconnected();
    }
}
