//! Identity endpoints for the signed-in caller.
//!
//! - GET `/me` - The resolved principal
//! - GET `/session` - Whether the caller is signed in, never 401
//! - GET `/users/{uuid}` - Look up any user (admin only)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::auth::{AdminOnly, Auth, AuthError, OptionalAuth};
use crate::db::{Database, User};

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/session", get(session))
        .route("/users/{uuid}", get(get_user))
        .with_state(state)
}

async fn me(Auth(user): Auth) -> Json<User> {
    Json(user)
}

#[derive(Serialize)]
struct SessionResponse {
    authenticated: bool,
    user: Option<User>,
}

async fn session(OptionalAuth(user): OptionalAuth) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: user.is_some(),
        user,
    })
}

async fn get_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<UsersState>,
    Path(uuid): Path<String>,
) -> Result<Response, AuthError> {
    let user = state
        .db
        .users()
        .get_by_uuid(&uuid)
        .await
        .map_err(|e| AuthError::storage("Failed to get user", e))?;

    Ok(match user {
        Some(user) => Json(user).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}
