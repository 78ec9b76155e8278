//! Inbound and outbound WebSocket event definitions.
//!
//! Every frame on the wire is a JSON object `{"event": NAME, "data": ...}`.
//! Field names inside payloads are camelCase.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use validator::{Validate, ValidationErrors};

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::types::id::{ChatId, MessageId, UserId};
use chathub_core::types::message::Attachment;

/// Names of all events the hub sends or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventName {
    NewMessage,
    NewMessageAlert,
    StartTyping,
    StopTyping,
    NewRequest,
    Alert,
    RefetchChats,
    ChatJoined,
    ChatLeaved,
    OnlineUsers,
    Error,
}

impl EventName {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewMessage => "NEW_MESSAGE",
            Self::NewMessageAlert => "NEW_MESSAGE_ALERT",
            Self::StartTyping => "START_TYPING",
            Self::StopTyping => "STOP_TYPING",
            Self::NewRequest => "NEW_REQUEST",
            Self::Alert => "ALERT",
            Self::RefetchChats => "REFETCH_CHATS",
            Self::ChatJoined => "CHAT_JOINED",
            Self::ChatLeaved => "CHAT_LEAVED",
            Self::OnlineUsers => "ONLINE_USERS",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events sent by the client to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundEvent {
    /// A chat message for every member of a chat.
    NewMessage(NewMessagePayload),
    /// Typing started.
    StartTyping(ChatSignalPayload),
    /// Typing stopped.
    StopTyping(ChatSignalPayload),
    /// A friend request was sent.
    NewRequest(ChatSignalPayload),
    /// Generic chat alert.
    Alert(ChatSignalPayload),
    /// Members should reload their chat list.
    RefetchChats(ChatSignalPayload),
    /// A user opened a chat.
    ChatJoined(PresencePayload),
    /// A user left a chat.
    ChatLeaved(PresencePayload),
}

impl InboundEvent {
    /// Event name of this inbound event.
    pub fn name(&self) -> EventName {
        match self {
            Self::NewMessage(_) => EventName::NewMessage,
            Self::StartTyping(_) => EventName::StartTyping,
            Self::StopTyping(_) => EventName::StopTyping,
            Self::NewRequest(_) => EventName::NewRequest,
            Self::Alert(_) => EventName::Alert,
            Self::RefetchChats(_) => EventName::RefetchChats,
            Self::ChatJoined(_) => EventName::ChatJoined,
            Self::ChatLeaved(_) => EventName::ChatLeaved,
        }
    }
}

impl Validate for InboundEvent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::NewMessage(payload) => payload.validate(),
            Self::StartTyping(payload)
            | Self::StopTyping(payload)
            | Self::NewRequest(payload)
            | Self::Alert(payload)
            | Self::RefetchChats(payload) => payload.validate(),
            Self::ChatJoined(payload) | Self::ChatLeaved(payload) => payload.validate(),
        }
    }
}

/// Payload of an inbound `NEW_MESSAGE`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    /// Target chat.
    pub chat_id: ChatId,
    /// Chat members to deliver to (sender included).
    pub members: Vec<UserId>,
    /// Text content.
    #[validate(length(min = 1, message = "Message content must not be empty"))]
    pub message: String,
}

/// Payload of the chat-scoped signal events (typing, alerts, refetch).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatSignalPayload {
    /// Target chat.
    pub chat_id: ChatId,
    /// Chat members to notify.
    pub members: Vec<UserId>,
}

/// Payload of `CHAT_JOINED` / `CHAT_LEAVED`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    /// The user joining or leaving.
    pub user_id: UserId,
    /// Chat members to notify.
    pub members: Vec<UserId>,
}

/// `{chatId}` payload of outbound signal events and `NEW_MESSAGE_ALERT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRef {
    pub chat_id: ChatId,
}

/// Outbound `NEW_MESSAGE` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageOut {
    /// Target chat.
    pub chat_id: ChatId,
    /// The message as shown to clients.
    pub message: RealtimeMessage,
}

/// Message sender as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderRef {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
}

/// A message as delivered over the socket.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    /// Locally generated identifier, independent of the stored one.
    #[serde(rename = "_id")]
    pub id: MessageId,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub sender: SenderRef,
    pub chat: ChatId,
    #[serde(rename = "createdAt", serialize_with = "serialize_iso_millis")]
    pub created_at: DateTime<Utc>,
}

/// Outbound `ERROR` payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Machine-readable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl From<&AppError> for ErrorPayload {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.kind.code(),
            message: err.message.clone(),
        }
    }
}

/// An outbound frame, borrowing its payload.
#[derive(Debug, Serialize)]
pub struct OutboundFrame<'a, T: Serialize> {
    pub event: EventName,
    pub data: &'a T,
}

impl<'a, T: Serialize> OutboundFrame<'a, T> {
    /// Create a frame.
    pub fn new(event: EventName, data: &'a T) -> Self {
        Self { event, data }
    }

    /// Serialize the frame to its JSON text.
    pub fn encode(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Failed to encode {} frame", self.event),
                e,
            )
        })
    }
}

fn serialize_iso_millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
