#![allow(dead_code)]

use axum::{
    Extension, Router,
    body::Body,
    http::{Request, Response, header},
};
use tower::ServiceExt;
use wordhoard::{
    ServerConfig,
    auth::FederatedProfile,
    create_app,
    db::{Database, User},
    jwt::{JwtConfig, SigningKey, TokenTtl, now_secs},
};

pub const TEST_KEY: [u8; 32] = [0x42; 32];

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

impl TestApp {
    /// Same app, with a provider session yielding `profile` on every request.
    pub fn with_profile(&self, profile: FederatedProfile) -> Router {
        self.app.clone().layer(Extension(profile))
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub async fn setup() -> TestApp {
    setup_with(TokenTtl::default(), false).await
}

pub async fn setup_with(ttl: TokenTtl, secure_cookies: bool) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let signing_key = SigningKey::from_bytes(TEST_KEY.to_vec()).unwrap();
    let jwt = JwtConfig::new(&signing_key, ttl);

    let config = ServerConfig {
        db: db.clone(),
        signing_key,
        ttl,
        secure_cookies,
        app_path: "/app".to_string(),
        error_path: "/login".to_string(),
    };

    TestApp {
        app: create_app(&config),
        db,
        jwt,
    }
}

pub fn profile(email: &str, name: &str, picture: Option<&str>) -> FederatedProfile {
    FederatedProfile {
        email: Some(email.to_string()),
        name: Some(name.to_string()),
        picture_url: picture.map(str::to_string),
    }
}

pub async fn create_user(db: &Database, email: &str, name: &str) -> User {
    db.users()
        .upsert_federated(email, name, None)
        .await
        .expect("Failed to create user")
}

pub fn now() -> u64 {
    now_secs().unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// The full Set-Cookie line for `name`, if present.
pub fn find_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    cookies
        .iter()
        .find(|c| c.starts_with(&prefix))
        .map(String::as_str)
}

/// The value part of a Set-Cookie line.
pub fn cookie_value(set_cookie: &str) -> &str {
    let pair = set_cookie.split(';').next().unwrap_or("");
    pair.split_once('=').map(|(_, v)| v).unwrap_or("")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
