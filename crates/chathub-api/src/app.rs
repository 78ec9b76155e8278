//! Application builder — wires backends, the hub, and the router together.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::watch;
use tracing::{info, warn};

use chathub_auth::{JwtDecoder, MemoryUserDirectory};
use chathub_core::config::{AppConfig, PersistenceBackend};
use chathub_core::error::AppError;
use chathub_core::traits::{MessageStore, UserDirectory};
use chathub_database::migration::run_migrations;
use chathub_database::{DatabasePool, PgMessageStore, PgUserDirectory};
use chathub_realtime::{AuthGate, ChatHub, MemoryMessageStore};

use crate::router::build_router;
use crate::state::AppState;

/// External collaborators the hub runs against.
pub struct Backends {
    /// Message store
    pub store: Arc<dyn MessageStore>,
    /// Principal lookup
    pub directory: Arc<dyn UserDirectory>,
    /// PostgreSQL pool, for the postgres backend
    pub database: Option<DatabasePool>,
}

impl Backends {
    /// Connects the backends selected by `persistence.backend`.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        match config.persistence.backend {
            PersistenceBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                let schema_version = run_migrations(pool.pool()).await?;
                info!(schema_version, "Postgres backends ready");

                Ok(Self {
                    store: Arc::new(PgMessageStore::new(pool.pool().clone())),
                    directory: Arc::new(PgUserDirectory::new(pool.pool().clone())),
                    database: Some(pool),
                })
            }
            PersistenceBackend::Memory => {
                warn!("Using in-memory message store and user directory");
                Ok(Self::memory(
                    Arc::new(MemoryMessageStore::new()),
                    Arc::new(MemoryUserDirectory::new()),
                ))
            }
        }
    }

    /// In-process backends.
    pub fn memory(store: Arc<MemoryMessageStore>, directory: Arc<MemoryUserDirectory>) -> Self {
        Self {
            store,
            directory,
            database: None,
        }
    }
}

/// Builds the hub and application state. Must be called inside a Tokio runtime.
pub fn build_state(config: AppConfig, backends: Backends) -> AppState {
    let gate = AuthGate::new(Arc::new(JwtDecoder::new(&config.auth)), backends.directory);
    let hub = ChatHub::new(
        config.realtime.clone(),
        &config.persistence,
        gate,
        backends.store,
    );

    AppState {
        config: Arc::new(config),
        hub: Arc::new(hub),
        database: backends.database,
        started_at: Instant::now(),
    }
}

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the ChatHub server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting ChatHub server...");

    let backends = Backends::connect(&config).await?;
    let state = build_state(config, backends);
    let hub = state.hub.clone();
    let database = state.database.clone();
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "ChatHub server listening");

    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, build_app(state)).with_graceful_shutdown(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        // Connection tasks only end once the hub tells them to.
        if let Err(e) = hub.shutdown().await {
            warn!(error = %e, "Hub shutdown failed");
        }
        let _ = stopping_tx.send(true);
    });
    let mut server_task = tokio::spawn(async move { server.await });

    let joined = tokio::select! {
        joined = &mut server_task => joined,
        _ = stopping_rx.changed() => match tokio::time::timeout(grace, &mut server_task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
                server_task.abort();
                Ok(Ok(()))
            }
        },
    };

    joined
        .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(database) = database {
        database.close().await;
    }

    info!("ChatHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
