//! Authenticated principal attached to a connection.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// The identity a connection acts as once the session cookie is verified.
///
/// Immutable for the lifetime of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub user_id: UserId,
    /// Display name, denormalized into real-time message payloads.
    pub display_name: String,
}

impl Principal {
    /// Creates a new principal.
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}
