//! Chat Service
//!
//! Turns an inbound chat text into a stored message with a detected
//! language, ready to be fanned out to the room.

use std::sync::Arc;

use crate::domain::{LanguageCode, Message, MessageRepository, NewMessage};
use crate::shared::error::AppError;

use super::TranslationGateway;

/// A stored chat message together with the language it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatBroadcast {
    pub message: Message,
    pub detected_language: LanguageCode,
}

pub struct ChatService {
    store: Arc<dyn MessageRepository>,
    translator: TranslationGateway,
}

impl ChatService {
    pub fn new(store: Arc<dyn MessageRepository>, translator: TranslationGateway) -> Self {
        Self { store, translator }
    }

    /// Stamp, detect and persist a chat message.
    ///
    /// The timestamp is taken on receipt, before detection runs. Detection
    /// never fails; a store failure is returned and nothing should be
    /// broadcast for this message.
    pub async fn ingest(
        &self,
        username: &str,
        room: &str,
        content: &str,
    ) -> Result<ChatBroadcast, AppError> {
        let draft = NewMessage::now(username, room, content);
        let detected_language = self.translator.detect_language(content).await;

        let message = self.store.append(draft).await?;
        tracing::debug!(
            room = %room,
            message_id = message.id,
            language = %detected_language,
            "Chat message stored"
        );

        Ok(ChatBroadcast {
            message,
            detected_language,
        })
    }
}
