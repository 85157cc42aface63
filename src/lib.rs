pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;

use api::{EntryPoints, REFRESH_PATH, create_api_router, create_auth_router};
use auth::{AuthBackend, CookiePolicy, authenticate};
use axum::{Router, middleware};
use db::Database;
use jwt::{JwtConfig, SigningKey, TokenTtl};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// HMAC key for signing tokens
    pub signing_key: SigningKey,
    /// Access and refresh token lifetimes
    pub ttl: TokenTtl,
    /// Whether to set Secure flag on cookies (must be true when served over HTTPS)
    pub secure_cookies: bool,
    /// Authenticated entry point the login bridge redirects to
    pub app_path: String,
    /// Error entry point the login bridge redirects to on failure
    pub error_path: String,
}

/// Create the application router with the given configuration.
///
/// The federated provider handshake is not part of this router. Whatever
/// performs it must place an `auth::FederatedProfile` (or the raw
/// `auth::UserInfoClaims`) in the request extensions before
/// `/login/oauth2/success` runs.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.signing_key, config.ttl));
    let cookies = Arc::new(CookiePolicy::new(config.secure_cookies, REFRESH_PATH));
    let entry = Arc::new(EntryPoints {
        app_path: config.app_path.clone(),
        error_path: config.error_path.clone(),
    });

    let backend = AuthBackend {
        db: config.db.clone(),
        jwt: jwt.clone(),
    };

    Router::new()
        .merge(create_auth_router(config.db.clone(), jwt, cookies, entry))
        .nest("/api", create_api_router(config.db.clone()))
        .layer(middleware::from_fn_with_state(
            backend,
            authenticate::<AuthBackend>,
        ))
}

/// Run the server on the given listener. This function blocks until the server exits,
/// then closes the database pool.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, make_service).await;
    config.db.close().await;
    result
}
