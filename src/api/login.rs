//! Federated login callbacks.
//!
//! - GET `/login/oauth2/success` - provider handshake succeeded; set token cookies, redirect into the app
//! - GET `/login/oauth2/failure` - provider handshake failed; redirect to the error entry point

use axum::{
    Router,
    extract::{Query, Request, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::{EntryPoints, OAUTH2_FAILURE_PATH, OAUTH2_SUCCESS_PATH};
use crate::auth::{CookiePolicy, FederatedLoginBridge, FederatedProfile, UserInfoClaims};
use crate::db::Database;
use crate::jwt::JwtConfig;

/// Reason used when the callback is reached without a provider session.
const NO_PROVIDER_SESSION: &str = "authentication_failed";

/// Reason used when the provider reports a failure without a usable code.
const PROVIDER_ERROR: &str = "provider_error";

#[derive(Clone)]
pub struct LoginState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cookies: Arc<CookiePolicy>,
    pub entry: Arc<EntryPoints>,
}

crate::impl_has_auth_backend!(LoginState);

pub fn router(state: LoginState) -> Router {
    Router::new()
        .route(OAUTH2_SUCCESS_PATH, get(oauth2_success))
        .route(OAUTH2_FAILURE_PATH, get(oauth2_failure))
        .with_state(state)
}

/// Complete the login: both cookies and a redirect into the app, or an error
/// redirect with no cookies at all.
async fn oauth2_success(State(state): State<LoginState>, request: Request) -> Response {
    let Some(profile) = provider_profile(&request) else {
        warn!("Federated callback reached without a provider session");
        return error_redirect(&state.entry.error_path, NO_PROVIDER_SESSION);
    };

    let login = match FederatedLoginBridge::new(&state).complete(&profile).await {
        Ok(login) => login,
        Err(e) => {
            warn!(code = e.code(), "Federated login failed");
            return error_redirect(&state.entry.error_path, e.code());
        }
    };

    let ttl = state.jwt.ttl();
    let access_cookie = state
        .cookies
        .access_cookie(&login.tokens.access_token, ttl.access_secs());
    let refresh_cookie = state
        .cookies
        .refresh_cookie(&login.tokens.refresh_token, ttl.refresh_secs());

    (
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Redirect::to(&state.entry.app_path),
    )
        .into_response()
}

/// The provider's attributes, as a ready profile or as raw user-info claims.
fn provider_profile(request: &Request) -> Option<FederatedProfile> {
    let extensions = request.extensions();
    extensions.get::<FederatedProfile>().cloned().or_else(|| {
        extensions
            .get::<UserInfoClaims>()
            .map(|claims| FederatedProfile::from_claims(&claims.0))
    })
}

#[derive(Deserialize)]
struct FailureParams {
    error: Option<String>,
}

async fn oauth2_failure(
    State(state): State<LoginState>,
    Query(params): Query<FailureParams>,
) -> Response {
    let reason = params
        .error
        .as_deref()
        .filter(|r| is_reason_code(r))
        .unwrap_or(PROVIDER_ERROR);
    warn!(reason = %reason, "Federated provider reported failure");
    error_redirect(&state.entry.error_path, reason)
}

/// Provider error codes are echoed only when they look like codes.
fn is_reason_code(reason: &str) -> bool {
    !reason.is_empty()
        && reason.len() <= 64
        && reason
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

fn error_redirect(error_path: &str, reason: &str) -> Response {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", reason)
        .finish();
    Redirect::to(&format!("{}?{}", error_path, query)).into_response()
}
