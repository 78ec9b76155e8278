//! In-memory message store for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use chathub_core::result::AppResult;
use chathub_core::traits::MessageStore;
use chathub_core::types::id::MessageId;
use chathub_core::types::message::{MessageRecord, NewMessage};

/// Keeps persisted messages in a process-local vector.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    records: RwLock<Vec<MessageRecord>>,
}

impl MemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records in insertion order
    pub async fn records(&self) -> Vec<MessageRecord> {
        self.records.read().await.clone()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn persist(&self, message: NewMessage) -> AppResult<MessageRecord> {
        let record = MessageRecord::from_new(MessageId::new(), message, Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
