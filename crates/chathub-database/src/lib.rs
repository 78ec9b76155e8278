//! # chathub-database
//!
//! PostgreSQL connection management and the concrete message store and
//! user directory backed by it.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::{DatabasePool, PoolStatus};
pub use repositories::message::PgMessageStore;
pub use repositories::user::PgUserDirectory;
