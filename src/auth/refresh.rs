//! Refresh token → new access token.
//!
//! Refresh tokens are not rotated and nothing records which ones were issued,
//! so a refresh token stays usable until its own expiry. The presented token is
//! handed back unchanged alongside the new access token.

use tracing::{info, warn};

use super::errors::AuthError;
use super::state::HasAuthBackend;
use crate::db::User;
use crate::jwt::{AccessToken, now_secs};

/// Result of a successful exchange.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    pub user: User,
    pub access: AccessToken,
}

pub struct RefreshExchange<'a, S> {
    state: &'a S,
}

impl<'a, S> RefreshExchange<'a, S>
where
    S: HasAuthBackend + Sync,
{
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Validate `refresh_token`, re-resolve its subject and mint a new access token.
    pub async fn exchange(&self, refresh_token: &str) -> Result<RefreshedAccess, AuthError> {
        let jwt = self.state.jwt();
        let now = now_secs().map_err(AuthError::token_issue)?;

        let claims = match jwt.validator().validate_at(refresh_token, now) {
            Ok(claims) if !claims.is_access() => claims,
            Ok(claims) => {
                warn!(subject = %claims.sub, "Access token presented for refresh");
                return Err(AuthError::InvalidRefreshToken);
            }
            Err(e) => {
                match jwt.validator().subject_even_if_expired(refresh_token) {
                    Ok(subject) => warn!(subject = %subject, reason = %e, "Rejected refresh token"),
                    Err(_) => warn!(reason = %e, "Rejected refresh token"),
                }
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        let user = self
            .state
            .db()
            .users()
            .get_by_email(&claims.sub)
            .await
            .map_err(|e| AuthError::storage("Failed to get user", e))?
            .ok_or_else(|| {
                warn!(subject = %claims.sub, "Refresh token for unknown user");
                AuthError::UserNotFound
            })?;

        let access = jwt
            .issuer()
            .issue_access_at(&user, now)
            .map_err(AuthError::token_issue)?;

        info!(subject = %user.email, "Access token refreshed");
        Ok(RefreshedAccess { user, access })
    }
}
