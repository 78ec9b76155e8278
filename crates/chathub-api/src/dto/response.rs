//! Response DTOs.

use serde::{Deserialize, Serialize};

use chathub_database::PoolStatus;
use chathub_realtime::MetricsSnapshot;
use chathub_realtime::presence::OnlineUser;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// `"connected"`, `"unavailable"`, or `"disabled"` for the memory backend.
    pub database: String,
    /// Pool occupancy, absent for the memory backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_pool: Option<DatabasePoolResponse>,
    /// Message store backend name.
    pub persistence_backend: String,
    /// Live WebSocket connections.
    pub ws_connections: usize,
    /// Users with a registered connection.
    pub registered_users: usize,
    /// Users in the presence set.
    pub online_users: usize,
    /// Hub counters.
    pub metrics: MetricsSnapshot,
}

/// Database pool figures in the detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabasePoolResponse {
    pub latency_ms: u64,
    pub size: u32,
    pub idle: usize,
    pub max_connections: u32,
}

impl From<PoolStatus> for DatabasePoolResponse {
    fn from(status: PoolStatus) -> Self {
        Self {
            latency_ms: status.latency_ms,
            size: status.size,
            idle: status.idle,
            max_connections: status.max_connections,
        }
    }
}

/// Presence snapshot response.
#[derive(Debug, Clone, Serialize)]
pub struct OnlineUsersResponse {
    pub count: usize,
    pub users: Vec<OnlineUser>,
}
