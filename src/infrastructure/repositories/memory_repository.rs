//! In-memory message repository.
//!
//! Used when no database URL is configured and throughout the test suite.
//! History is lost on restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Message, MessageRepository, NewMessage};
use crate::shared::error::AppError;

/// Process-local message store.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: RwLock<Vec<Message>>,
    next_id: AtomicI64,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages across all rooms.
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, message: NewMessage) -> Result<Message, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = message.into_message(id);
        self.messages.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_by_room(&self, room: &str) -> Result<Vec<Message>, AppError> {
        let mut messages: Vec<Message> = self
            .messages
            .read()
            .iter()
            .filter(|m| m.room == room)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn delete_by_room(&self, room: &str) -> Result<(), AppError> {
        self.messages.write().retain(|m| m.room != room);
        Ok(())
    }
}
