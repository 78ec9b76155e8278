//! # chathub-api
//!
//! HTTP API layer for ChatHub built on Axum.
//!
//! Provides the WebSocket upgrade endpoint, health and presence routes,
//! middleware (CORS, request logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Backends, build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
