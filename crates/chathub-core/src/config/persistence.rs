//! Message persistence configuration.

use serde::{Deserialize, Serialize};

/// Which message store backs the persistor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    /// Process-local store, lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via the `database` section.
    Postgres,
}

/// Background message persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Store backend.
    #[serde(default)]
    pub backend: PersistenceBackend,
    /// Capacity of the pending-write queue. Writes beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Extra attempts after a failed write. `0` means at-most-once.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay between attempts in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            queue_capacity: default_queue_capacity(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_retry_backoff() -> u64 {
    250
}
