//! PostgreSQL-backed message store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_core::traits::MessageStore;
use chathub_core::types::id::MessageId;
use chathub_core::types::message::{MessageRecord, NewMessage};

/// Message store writing to the `messages` table.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Create a new message store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn persist(&self, message: NewMessage) -> AppResult<MessageRecord> {
        let id = MessageId::new();

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO messages (id, content, attachments, sender_id, chat_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING created_at",
        )
        .bind(id)
        .bind(&message.content)
        .bind(Json(&message.attachments))
        .bind(message.sender_id)
        .bind(message.chat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to insert message", e))?;

        Ok(MessageRecord::from_new(id, message, created_at))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
