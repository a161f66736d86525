//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A chat message as persisted in room history.
///
/// Maps to the `messages` table:
/// - id: BIGSERIAL PRIMARY KEY (assigned by the store)
/// - username: TEXT NOT NULL
/// - room: TEXT NOT NULL
/// - content: TEXT NOT NULL (the original, untranslated text)
/// - timestamp: TIMESTAMPTZ NOT NULL
///
/// Messages are immutable once stored; the only mutation is deleting
/// an entire room's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned ID
    pub id: i64,

    /// Author display name (not unique)
    pub username: String,

    /// Room identifier (case-sensitive)
    pub room: String,

    /// Message content as the author wrote it
    pub content: String,

    /// When the message was received
    pub timestamp: DateTime<Utc>,
}

/// A message that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub username: String,
    pub room: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl NewMessage {
    /// Create a message stamped with the current time.
    pub fn now(
        username: impl Into<String>,
        room: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            room: room.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Attach the store-assigned ID.
    pub fn into_message(self, id: i64) -> Message {
        Message {
            id,
            username: self.username,
            room: self.room,
            content: self.content,
            timestamp: self.timestamp,
        }
    }
}

/// Repository trait for room history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a message and return it with its assigned ID.
    async fn append(&self, message: NewMessage) -> Result<Message, AppError>;

    /// All messages of a room, oldest first.
    async fn list_by_room(&self, room: &str) -> Result<Vec<Message>, AppError>;

    /// Delete every message of a room.
    async fn delete_by_room(&self, room: &str) -> Result<(), AppError>;
}
