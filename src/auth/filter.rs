//! Per-request authentication filter and the extractors that read its result.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::error;

use super::errors::AuthError;
use super::resolver::IdentityResolver;
use super::state::HasAuthBackend;
use crate::db::{User, UserRole};

/// The principal resolved for this request, or `None` for anonymous callers.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Middleware: resolve the caller and attach `CurrentUser` to the request.
///
/// Always calls through. Rejecting anonymous requests is the job of the
/// extractors below (or any other downstream policy).
pub async fn authenticate<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    let user = match IdentityResolver::default()
        .resolve(request.headers(), &state)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "User lookup failed, continuing unauthenticated");
            None
        }
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

fn current_user(parts: &Parts) -> Option<User> {
    parts
        .extensions
        .get::<CurrentUser>()
        .and_then(|current| current.0.clone())
}

/// Extractor for endpoints that require an authenticated user.
/// Returns JSON 401 when the request is anonymous.
pub struct Auth(pub User);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .map(Auth)
            .ok_or(AuthError::NotAuthenticated)
    }
}

/// Optional authentication extractor - never fails.
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(current_user(parts)))
    }
}

/// Extractor for admin-only endpoints: 401 when anonymous, 403 for other roles.
pub struct AdminOnly(pub User);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).ok_or(AuthError::NotAuthenticated)?;
        if user.role != UserRole::Admin {
            return Err(AuthError::InsufficientRole);
        }
        Ok(AdminOnly(user))
    }
}
