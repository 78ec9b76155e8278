//! Real-time hub configuration.

use serde::{Deserialize, Serialize};

/// How the connection registry treats a second connection from the same user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    /// A new connection replaces the user's previous one; only the most
    /// recently registered connection receives targeted events.
    #[default]
    LastWriterWins,
    /// Every live connection of a user receives targeted events.
    MultiDevice,
}

/// Real-time (WebSocket) hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Largest accepted inbound text frame, in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Registry policy for users with several connections.
    #[serde(default)]
    pub connection_policy: ConnectionPolicy,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            max_frame_bytes: default_max_frame_bytes(),
            connection_policy: ConnectionPolicy::default(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_max_frame_bytes() -> usize {
    65_536
}
