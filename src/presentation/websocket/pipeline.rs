//! Message Ingest Pipeline
//!
//! Interprets frames from one client: the init frame first, then language
//! updates and chat messages. Each call reports whether the connection
//! should keep going.

use std::sync::Arc;

use super::broadcast::BroadcastEngine;
use super::messages::{
    parse_client_event, parse_init, ClientEvent, OutboundEvent, INVALID_INIT, INVALID_MESSAGE,
    MESSAGE_NOT_SAVED,
};
use super::session::Session;
use crate::application::services::ChatService;

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Client sent a Close frame, the stream ended, or the transport failed
    Disconnected,
    InvalidInit,
    InvalidMessage,
    /// The session was terminated by the server (slow consumer)
    Terminated,
}

/// What the connection should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close(CloseReason),
}

pub struct IngestPipeline {
    chat: Arc<ChatService>,
    engine: Arc<BroadcastEngine>,
}

impl IngestPipeline {
    pub fn new(chat: Arc<ChatService>, engine: Arc<BroadcastEngine>) -> Self {
        Self { chat, engine }
    }

    /// Handle the first frame of a connection.
    pub async fn handle_init(&self, session: &Session, raw: &[u8]) -> Flow {
        let language = match parse_init(raw) {
            Ok(language) => language,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "Rejected init frame");
                // The connection closes either way
                let _ = session.deliver(&OutboundEvent::error(INVALID_INIT)).await;
                return Flow::Close(CloseReason::InvalidInit);
            }
        };

        session.set_preferred_language(language.clone());
        tracing::info!(
            room = %session.room(),
            username = %session.username(),
            session_id = %session.id(),
            language = %language,
            "Client joined"
        );

        reply(
            session,
            OutboundEvent::joined(session.room(), session.username(), &language),
        )
        .await
    }

    /// Handle a frame from a joined client.
    pub async fn handle_event(&self, session: &Session, raw: &[u8]) -> Flow {
        let event = match parse_client_event(raw) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(session_id = %session.id(), error = %e, "Rejected client frame");
                let _ = session.deliver(&OutboundEvent::error(INVALID_MESSAGE)).await;
                return Flow::Close(CloseReason::InvalidMessage);
            }
        };

        match event {
            ClientEvent::UpdateLanguage(language) => {
                session.set_preferred_language(language.clone());
                tracing::debug!(session_id = %session.id(), language = %language, "Language updated");
                reply(session, OutboundEvent::language_updated(&language)).await
            }
            ClientEvent::File => Flow::Continue,
            ClientEvent::Chat { content } => {
                match self
                    .chat
                    .ingest(session.username(), session.room(), &content)
                    .await
                {
                    Ok(chat) => {
                        self.engine.broadcast_chat(&chat).await;
                        Flow::Continue
                    }
                    Err(e) => {
                        tracing::error!(
                            room = %session.room(),
                            session_id = %session.id(),
                            error = %e,
                            "Failed to store chat message"
                        );
                        reply(session, OutboundEvent::error(MESSAGE_NOT_SAVED)).await
                    }
                }
            }
        }
    }
}

async fn reply(session: &Session, event: OutboundEvent) -> Flow {
    match session.deliver(&event).await {
        Ok(()) => Flow::Continue,
        Err(e) => {
            tracing::debug!(session_id = %session.id(), error = %e, "Reply could not be queued");
            Flow::Close(CloseReason::Disconnected)
        }
    }
}
