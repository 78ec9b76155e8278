//! Builds both representations of a chat message from one input.

use chrono::Utc;

use chathub_core::types::id::{ChatId, MessageId};
use chathub_core::types::message::{Attachment, NewMessage};
use chathub_core::types::principal::Principal;

use super::types::{RealtimeMessage, SenderRef};

/// Build the real-time payload and the persistence record for a message.
///
/// Content, attachments and chat are identical in both. The real-time
/// `_id` is generated here and is unrelated to the id the store assigns.
pub fn build_message_pair(
    sender: &Principal,
    chat_id: ChatId,
    content: String,
    attachments: Vec<Attachment>,
) -> (RealtimeMessage, NewMessage) {
    let realtime = RealtimeMessage {
        id: MessageId::new(),
        content: content.clone(),
        attachments: attachments.clone(),
        sender: SenderRef {
            id: sender.user_id,
            name: sender.display_name.clone(),
        },
        chat: chat_id,
        created_at: Utc::now(),
    };

    let record = NewMessage {
        content,
        attachments,
        sender_id: sender.user_id,
        chat_id,
    };

    (realtime, record)
}
