//! PostgreSQL-backed user directory.

use async_trait::async_trait;
use sqlx::PgPool;

use chathub_core::error::{AppError, ErrorKind};
use chathub_core::result::AppResult;
use chathub_core::traits::UserDirectory;
use chathub_core::types::id::UserId;
use chathub_core::types::principal::Principal;

/// Looks principals up in the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a new user directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to look up user", e))?;

        Ok(name.map(|display_name| Principal::new(user_id, display_name)))
    }
}
