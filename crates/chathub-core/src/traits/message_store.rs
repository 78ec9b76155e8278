//! Message store abstraction consumed by the realtime hub.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::message::{MessageRecord, NewMessage};

/// Durable storage for chat messages.
///
/// Implementations must be safe to call concurrently. The hub invokes
/// `persist` only after the real-time payload has been dispatched and never
/// waits on the result to decide delivery.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Stores a message and returns the record with its assigned id.
    async fn persist(&self, message: NewMessage) -> AppResult<MessageRecord>;

    /// Human-readable backend name for logs.
    fn backend_name(&self) -> &'static str;
}
