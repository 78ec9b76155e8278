//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use chathub_core::config::AppConfig;
use chathub_database::DatabasePool;
use chathub_realtime::ChatHub;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Realtime hub
    pub hub: Arc<ChatHub>,
    /// PostgreSQL pool, when the postgres backend is configured
    pub database: Option<DatabasePool>,
    /// Process start time, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Seconds since the state was created
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
