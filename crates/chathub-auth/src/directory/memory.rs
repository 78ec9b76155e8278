//! In-memory user directory for development and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use chathub_core::result::AppResult;
use chathub_core::traits::UserDirectory;
use chathub_core::types::id::UserId;
use chathub_core::types::principal::Principal;

/// Process-local user directory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    /// User ID → display name
    users: DashMap<UserId, String>,
}

impl MemoryUserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or rename a user
    pub fn insert(&self, user_id: UserId, display_name: impl Into<String>) {
        self.users.insert(user_id, display_name.into());
    }

    /// Remove a user
    pub fn remove(&self, user_id: UserId) -> bool {
        self.users.remove(&user_id).is_some()
    }

    /// Number of known users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self
            .users
            .get(&user_id)
            .map(|name| Principal::new(user_id, name.value().clone())))
    }
}
