//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod persistence;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::persistence::{PersistenceBackend, PersistenceConfig};
pub use self::realtime::{ConnectionPolicy, RealtimeConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay) and `CHATHUB__*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Session token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Real-time hub settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Message persistence settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and environment
    /// variables prefixed with `CHATHUB` (`CHATHUB__AUTH__JWT_SECRET=...`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHATHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").expect("empty config loads");
        assert_eq!(config.auth.cookie_name, "app-token");
        assert_eq!(config.realtime.connection_policy, ConnectionPolicy::LastWriterWins);
        assert_eq!(config.persistence.backend, PersistenceBackend::Memory);
        assert_eq!(config.persistence.max_retries, 0);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 4100

            [realtime]
            connection_policy = "multi_device"
            channel_buffer_size = 8

            [persistence]
            backend = "postgres"
            max_retries = 3
            "#,
        )
        .expect("config loads");

        assert_eq!(config.server.port, 4100);
        assert_eq!(config.realtime.connection_policy, ConnectionPolicy::MultiDevice);
        assert_eq!(config.realtime.channel_buffer_size, 8);
        assert_eq!(config.persistence.backend, PersistenceBackend::Postgres);
        assert_eq!(config.persistence.max_retries, 3);
        assert_eq!(config.persistence.queue_capacity, 1024);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [realtime]
            connection_policy = "round_robin"
            "#,
        );
        assert!(result.is_err());
    }
}
