//! Token endpoints.
//!
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/logout` - Clear both token cookies

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{LOGOUT_PATH, REFRESH_PATH};
use crate::auth::{AuthError, CookiePolicy, REFRESH_COOKIE_NAME, RefreshExchange, get_cookie};
use crate::db::Database;
use crate::jwt::{JwtConfig, TOKEN_TYPE, TokenPair};

#[derive(Clone)]
pub struct TokensState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cookies: Arc<CookiePolicy>,
}

crate::impl_has_auth_backend!(TokensState);

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route(REFRESH_PATH, post(refresh_token))
        .route(LOGOUT_PATH, post(logout))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest {
    refresh_token: Option<String>,
}

/// Refresh the access token using a valid refresh token.
///
/// The token comes from the JSON body (`refreshToken`) or, for browsers, the
/// path-scoped refresh cookie. The refresh token is returned unchanged.
async fn refresh_token(
    State(state): State<TokensState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AuthError> {
    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<RefreshRequest>(&body)
            .map_err(|_| AuthError::InvalidRefreshToken)?
            .refresh_token
            .filter(|t| !t.is_empty())
    };

    let presented = from_body
        .or_else(|| get_cookie(&headers, REFRESH_COOKIE_NAME).map(str::to_string))
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidRefreshToken)?;

    let refreshed = RefreshExchange::new(&state).exchange(&presented).await?;

    let access_cookie = state
        .cookies
        .access_cookie(&refreshed.access.token, refreshed.access.duration);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, access_cookie)],
        Json(TokenPair {
            token_type: TOKEN_TYPE,
            access_token: refreshed.access.token,
            refresh_token: presented,
        }),
    ))
}

/// Clear both cookies. Tokens are stateless, so this does not revoke anything.
async fn logout(State(state): State<TokensState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, state.cookies.clear_access()),
            (SET_COOKIE, state.cookies.clear_refresh()),
        ]),
        Json(serde_json::json!({ "success": true })),
    )
}
