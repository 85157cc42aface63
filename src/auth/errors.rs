//! Authentication error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::jwt::TokenError;

/// Identity-level failures surfaced to callers.
///
/// Token-level failures never reach this type as such: the validator collapses
/// them into "not valid", which the refresh exchange reports as `InvalidRefreshToken`.
#[derive(Debug)]
pub enum AuthError {
    MissingEmailAttribute,
    UserNotFound,
    InvalidRefreshToken,
    NotAuthenticated,
    InsufficientRole,
    Storage,
    TokenIssue,
}

impl AuthError {
    /// Log a storage failure and return the opaque error.
    pub fn storage(context: &str, e: impl std::fmt::Display) -> Self {
        error!(error = %e, "{}", context);
        Self::Storage
    }

    /// Log a signing failure and return the opaque error.
    pub fn token_issue(e: TokenError) -> Self {
        error!(error = %e, "Failed to issue token");
        Self::TokenIssue
    }

    /// Machine-readable code, used in JSON bodies and error redirects.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingEmailAttribute => "missing_email_attribute",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InvalidRefreshToken => "invalid_refresh_token",
            AuthError::NotAuthenticated => "not_authenticated",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::Storage => "storage_error",
            AuthError::TokenIssue => "token_issue_failed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingEmailAttribute
            | AuthError::UserNotFound
            | AuthError::InvalidRefreshToken
            | AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::Storage | AuthError::TokenIssue => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::MissingEmailAttribute => "Identity provider did not supply an email",
            AuthError::UserNotFound => "User not found",
            AuthError::InvalidRefreshToken => "Invalid or expired refresh token",
            AuthError::NotAuthenticated => "Not authenticated",
            AuthError::InsufficientRole => "Insufficient permissions",
            AuthError::Storage => "Database error",
            AuthError::TokenIssue => "Failed to generate token",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AuthError {}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
                code: self.code(),
            }),
        )
            .into_response()
    }
}
