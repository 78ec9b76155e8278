//! User lookup used during connection authentication.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::UserId;
use crate::types::principal::Principal;

/// Resolves a verified token subject to a principal.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Returns the principal for `user_id`, or `None` if the user does not exist.
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>>;
}
