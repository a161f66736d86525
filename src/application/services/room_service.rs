//! Room Service
//!
//! Room history reads and resets. Rooms themselves are not stored; a room
//! "exists" while it has connections or history.

use std::sync::Arc;

use crate::domain::{Message, MessageRepository};
use crate::shared::error::AppError;

pub struct RoomService {
    store: Arc<dyn MessageRepository>,
}

impl RoomService {
    pub fn new(store: Arc<dyn MessageRepository>) -> Self {
        Self { store }
    }

    /// Full history of a room, oldest first.
    pub async fn history(&self, room: &str) -> Result<Vec<Message>, AppError> {
        self.store.list_by_room(room).await
    }

    /// Drop a room's history so it starts empty.
    pub async fn reset(&self, room: &str) -> Result<(), AppError> {
        self.store.delete_by_room(room).await?;
        tracing::info!(room = %room, "Room history reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewMessage;
    use crate::infrastructure::repositories::InMemoryMessageRepository;

    #[tokio::test]
    async fn test_reset_clears_only_that_room() {
        let store = Arc::new(InMemoryMessageRepository::new());
        store.append(NewMessage::now("a", "lobby", "one")).await.unwrap();
        store.append(NewMessage::now("b", "dev", "two")).await.unwrap();
        let service = RoomService::new(store);

        service.reset("lobby").await.unwrap();

        assert!(service.history("lobby").await.unwrap().is_empty());
        assert_eq!(service.history("dev").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_of_unknown_room_is_empty() {
        let service = RoomService::new(Arc::new(InMemoryMessageRepository::new()));
        assert!(service.history("nowhere").await.unwrap().is_empty());
    }
}
