//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::{Database, UserRole};
use crate::jwt::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, SigningKey, TokenTtl};
use clap::Parser;
use tracing::{error, info};
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "wordhoard", about = "Vocabulary trainer with federated login")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7292")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "wordhoard.db")]
    pub database: String,

    /// Public origin of the site (e.g. "https://words.example.com"). HTTPS enables Secure cookies
    #[arg(long, default_value = "http://localhost:7292")]
    pub public_origin: String,

    /// Path to file containing the base64 signing key. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL", default_value_t = DEFAULT_ACCESS_TTL_SECS)]
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "REFRESH_TOKEN_TTL", default_value_t = DEFAULT_REFRESH_TTL_SECS)]
    pub refresh_ttl_secs: u64,

    /// Where to send the browser after a successful login
    #[arg(long, default_value = "/app", value_parser = validate_path)]
    pub app_path: String,

    /// Where to send the browser after a failed login (receives ?error=<code>)
    #[arg(long, default_value = "/login", value_parser = validate_path)]
    pub error_path: String,

    /// Promote an existing user (by email) to admin on startup
    #[arg(long)]
    pub grant_admin: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn validate_path(s: &str) -> Result<String, String> {
    if !s.starts_with('/') {
        return Err(format!("Path must start with '/': {}", s));
    }

    if s.starts_with("//") {
        return Err(format!("Path must not start with '//': {}", s));
    }

    if s.chars().any(|c| !c.is_ascii() || c.is_whitespace() || c == '?' || c == '#') {
        return Err(format!("Path contains invalid characters: {}", s));
    }

    Ok(s.to_string())
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the base64 signing key from environment variable or file.
/// Returns None and logs an error if the key cannot be loaded.
pub fn load_signing_key(jwt_secret_file: Option<&str>) -> Option<SigningKey> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    match SigningKey::from_base64(&secret) {
        Ok(key) => Some(key),
        Err(e) => {
            error!(error = %e, "Invalid JWT secret");
            None
        }
    }
}

/// Validate access/refresh lifetimes.
pub fn validate_ttl(access_secs: u64, refresh_secs: u64) -> Option<TokenTtl> {
    match TokenTtl::from_secs(access_secs, refresh_secs) {
        Ok(ttl) => Some(ttl),
        Err(e) => {
            error!(access = access_secs, refresh = refresh_secs, error = %e, "Invalid token lifetimes");
            None
        }
    }
}

/// Parse and validate the public origin URL.
/// Returns None and logs an error if validation fails.
pub fn validate_public_origin(public_origin: &str) -> Option<Url> {
    let url = match Url::parse(public_origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %public_origin, error = %e, "Invalid public-origin URL");
            return None;
        }
    };

    let is_https = url.scheme() == "https";
    let is_localhost = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));

    if !is_https && !is_localhost {
        error!("public-origin must use HTTPS for non-localhost deployments");
        return None;
    }

    Some(url)
}

/// Handle the --grant-admin flag.
pub async fn handle_grant_admin(db: &Database, email: &str) {
    match db.users().set_role(email, UserRole::Admin).await {
        Ok(true) => info!(email = %email, "Granted admin role"),
        Ok(false) => {
            error!(email = %email, "No user with this email; they must log in once first");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "Failed to grant admin role");
            std::process::exit(1);
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    public_origin: &Url,
    signing_key: SigningKey,
    ttl: TokenTtl,
    app_path: String,
    error_path: String,
) -> ServerConfig {
    let secure_cookies = public_origin.scheme() == "https";

    ServerConfig {
        db,
        signing_key,
        ttl,
        secure_cookies,
        app_path,
        error_path,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
