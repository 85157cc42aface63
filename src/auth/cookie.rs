//! Cookie parsing and `Set-Cookie` construction for token transport.

use axum::http::header;

/// Cookie name for the access token (browser-driven flows).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token. Only sent to the refresh endpoint.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// How token cookies are scoped and flagged.
///
/// The access cookie is visible to the whole site; the refresh cookie only to
/// the refresh endpoint. Both are HttpOnly and SameSite=Lax. `Secure` must be
/// on whenever the site is served over HTTPS.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub refresh_path: String,
}

impl CookiePolicy {
    pub fn new(secure: bool, refresh_path: impl Into<String>) -> Self {
        Self {
            secure,
            refresh_path: refresh_path.into(),
        }
    }

    pub fn access_cookie(&self, token: &str, max_age: u64) -> String {
        self.build(ACCESS_COOKIE_NAME, token, "/", max_age)
    }

    pub fn refresh_cookie(&self, token: &str, max_age: u64) -> String {
        self.build(REFRESH_COOKIE_NAME, token, &self.refresh_path, max_age)
    }

    pub fn clear_access(&self) -> String {
        self.build(ACCESS_COOKIE_NAME, "", "/", 0)
    }

    pub fn clear_refresh(&self) -> String {
        self.build(REFRESH_COOKIE_NAME, "", &self.refresh_path, 0)
    }

    fn build(&self, name: &str, value: &str, path: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path={}; Max-Age={}{}",
            name, value, path, max_age, secure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_get_cookie_simple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=abc123"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; access_token=abc123; refresh_token=xyz789"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "refresh_token"), Some("xyz789"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
    }

    #[test]
    fn test_get_cookie_not_found() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("foo=bar"));

        assert_eq!(get_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn test_get_cookie_no_header() {
        let headers = axum::http::HeaderMap::new();
        assert_eq!(get_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn test_access_cookie_attributes() {
        let policy = CookiePolicy::new(false, "/refresh");
        assert_eq!(
            policy.access_cookie("tok", 3600),
            "access_token=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=3600"
        );
    }

    #[test]
    fn test_refresh_cookie_scoped_to_refresh_path() {
        let policy = CookiePolicy::new(true, "/refresh");
        assert_eq!(
            policy.refresh_cookie("tok", 2592000),
            "refresh_token=tok; HttpOnly; SameSite=Lax; Path=/refresh; Max-Age=2592000; Secure"
        );
    }

    #[test]
    fn test_clear_cookies_match_paths() {
        let policy = CookiePolicy::new(false, "/refresh");
        assert!(policy.clear_access().contains("Path=/;"));
        assert!(policy.clear_access().contains("Max-Age=0"));
        assert!(policy.clear_refresh().contains("Path=/refresh;"));
        assert!(policy.clear_refresh().starts_with("refresh_token=;"));
    }
}
