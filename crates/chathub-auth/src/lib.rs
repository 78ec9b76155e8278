//! # chathub-auth
//!
//! Session token handling for ChatHub.
//!
//! ## Modules
//!
//! - `jwt` — HS256 session token claims, verification, and issuance
//! - `directory` — in-memory [`UserDirectory`](chathub_core::traits::UserDirectory) backend

pub mod directory;
pub mod jwt;

pub use directory::MemoryUserDirectory;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
