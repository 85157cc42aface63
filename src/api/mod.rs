mod login;
mod tokens;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::auth::CookiePolicy;
use crate::db::Database;
use crate::jwt::JwtConfig;

pub use login::LoginState;
pub use tokens::TokensState;
pub use users::UsersState;

/// Federated login callback (success).
pub const OAUTH2_SUCCESS_PATH: &str = "/login/oauth2/success";

/// Federated login callback (failure).
pub const OAUTH2_FAILURE_PATH: &str = "/login/oauth2/failure";

/// Refresh endpoint. The refresh cookie is scoped to this path.
pub const REFRESH_PATH: &str = "/refresh";

pub const LOGOUT_PATH: &str = "/logout";

/// Where the login bridge sends the browser afterwards.
#[derive(Debug, Clone)]
pub struct EntryPoints {
    /// Authenticated entry point of the application
    pub app_path: String,
    /// Error entry point; receives `?error=<code>`
    pub error_path: String,
}

/// Create the router for the login callbacks and token endpoints.
pub fn create_auth_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    cookies: Arc<CookiePolicy>,
    entry: Arc<EntryPoints>,
) -> Router {
    let login_state = LoginState {
        db: db.clone(),
        jwt: jwt.clone(),
        cookies: cookies.clone(),
        entry,
    };

    let tokens_state = TokensState { db, jwt, cookies };

    Router::new()
        .merge(login::router(login_state))
        .merge(tokens::router(tokens_state))
}

/// Create the API router.
pub fn create_api_router(db: Database) -> Router {
    users::router(UsersState { db })
}
