//! WebSocket authentication — validates the session cookie before upgrade.

use std::sync::Arc;

use tracing::{debug, error};

use chathub_auth::jwt::JwtDecoder;
use chathub_core::error::AppError;
use chathub_core::traits::UserDirectory;
use chathub_core::types::principal::Principal;

/// Admits connections that present a valid session token for a known user.
#[derive(Clone)]
pub struct AuthGate {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// Principal lookup.
    directory: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate").finish()
    }
}

impl AuthGate {
    /// Creates a new gate.
    pub fn new(decoder: Arc<JwtDecoder>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { decoder, directory }
    }

    /// Authenticates a connection from the raw session token (the cookie value).
    ///
    /// Every failure, including a directory outage, is reported as
    /// an authentication error.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, AppError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthenticated("Please login to access this route"))?;

        let claims = self.decoder.decode_session_token(token)?;
        let user_id = claims.user_id();

        match self.directory.find_principal(user_id).await {
            Ok(Some(principal)) => Ok(principal),
            Ok(None) => {
                debug!(user_id = %user_id, "Token subject is not a known user");
                Err(AppError::unauthenticated("Please login to access this route"))
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "User lookup failed during authentication");
                Err(AppError::unauthenticated("Please login to access this route"))
            }
        }
    }
}
