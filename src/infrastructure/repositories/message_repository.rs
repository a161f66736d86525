//! Message Repository Implementation
//!
//! PostgreSQL implementation of room history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageRepository, NewMessage};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    username: String,
    room: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            username: self.username,
            room: self.room,
            content: self.content,
            timestamp: self.timestamp,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn append(&self, message: NewMessage) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (username, room, content, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, room, content, timestamp
            "#,
        )
        .bind(&message.username)
        .bind(&message.room)
        .bind(&message.content)
        .bind(message.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    /// Room history, oldest first. Ties on timestamp fall back to insertion order.
    async fn list_by_room(&self, room: &str) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, username, room, content, timestamp
            FROM messages
            WHERE room = $1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(room)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    async fn delete_by_room(&self, room: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE room = $1")
            .bind(room)
            .execute(&self.pool)
            .await?;

        tracing::debug!(room = %room, deleted = result.rows_affected(), "Room history cleared");
        Ok(())
    }
}
