//! Request → principal resolution.

use axum::http::{HeaderMap, header};
use tracing::debug;

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::state::HasAuthBackend;
use crate::db::User;

/// A pure strategy locating a candidate token in request headers.
pub type TokenExtractor = fn(&HeaderMap) -> Option<&str>;

/// `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The access token cookie set by the federated login.
pub fn access_cookie_token(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, ACCESS_COOKIE_NAME).filter(|t| !t.is_empty())
}

/// Header first, cookie second.
pub const DEFAULT_EXTRACTORS: &[TokenExtractor] = &[bearer_token, access_cookie_token];

/// Resolves an inbound request to a principal, or to nobody.
///
/// "Nobody" is not an error: a missing, invalid or expired token, or a token
/// naming a user that no longer exists, all resolve to `None` and downstream
/// authorization decides what to do with an anonymous request.
#[derive(Clone, Copy)]
pub struct IdentityResolver {
    extractors: &'static [TokenExtractor],
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTORS)
    }
}

impl IdentityResolver {
    pub const fn new(extractors: &'static [TokenExtractor]) -> Self {
        Self { extractors }
    }

    /// The first candidate token found, in extractor order.
    pub fn candidate<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        self.extractors.iter().find_map(|extract| extract(headers))
    }

    /// Resolve the caller. Only storage failures are errors.
    pub async fn resolve<S>(&self, headers: &HeaderMap, state: &S) -> Result<Option<User>, sqlx::Error>
    where
        S: HasAuthBackend + Sync,
    {
        let Some(token) = self.candidate(headers) else {
            return Ok(None);
        };

        let claims = match state.jwt().validator().validate(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(reason = %e, "Ignoring invalid token");
                return Ok(None);
            }
        };

        // Refresh tokens carry no authorities and never authorize a request.
        if !claims.is_access() {
            debug!("Ignoring refresh token presented as access token");
            return Ok(None);
        }

        let user = state.db().users().get_by_email(&claims.sub).await?;
        if user.is_none() {
            debug!(subject = %claims.sub, "Token subject no longer exists");
        }
        Ok(user)
    }
}
