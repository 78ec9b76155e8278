//! Chat message persistence model.
//!
//! The hub never owns stored messages; it only hands [`NewMessage`] values
//! to the configured message store, which assigns the identifier and
//! creation time and returns the resulting [`MessageRecord`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ChatId, MessageId, UserId};

/// An uploaded file referenced by a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Identifier at the upload provider.
    pub public_id: String,
    /// Public URL.
    pub url: String,
}

/// A message as handed to the store. Carries no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Text content (may be empty for attachment-only messages).
    pub content: String,
    /// Attachments, possibly empty.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Sending user.
    pub sender_id: UserId,
    /// Target chat.
    pub chat_id: ChatId,
}

/// A message as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Store-assigned identifier.
    pub id: MessageId,
    /// Text content.
    pub content: String,
    /// Attachments.
    pub attachments: Vec<Attachment>,
    /// Sending user.
    pub sender_id: UserId,
    /// Target chat.
    pub chat_id: ChatId,
    /// Store-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Materializes a stored record from a new message.
    pub fn from_new(id: MessageId, message: NewMessage, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content: message.content,
            attachments: message.attachments,
            sender_id: message.sender_id,
            chat_id: message.chat_id,
            created_at,
        }
    }
}
