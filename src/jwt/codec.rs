//! Signed claim encoding (HS256 JWT).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::key::SigningKey;
use super::now_secs;

/// Claim set carried inside a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Comma-joined authorities. Present on access tokens, absent on refresh tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    /// True for access tokens, which are the only tokens usable for authorization.
    pub fn is_access(&self) -> bool {
        self.auth.is_some()
    }
}

/// A token whose signature and structure verified. Expiry is reported, not enforced.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    pub claims: Claims,
    pub expired: bool,
}

/// Signs and verifies tokens with the process-wide HMAC key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is decided by the caller, see ParsedToken::expired.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Encode and sign a claim set.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token against the current clock.
    pub fn parse(&self, token: &str) -> Result<ParsedToken, TokenError> {
        self.parse_at(token, now_secs()?)
    }

    /// Verify a token, judging expiry against `now` (Unix seconds).
    pub fn parse_at(&self, token: &str, now: u64) -> Result<ParsedToken, TokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| {
            if declares_foreign_algorithm(token) {
                TokenError::UnsupportedAlgorithm
            } else {
                TokenError::from_kind(e.kind())
            }
        })?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::from_kind(e.kind()))?;

        if data.claims.sub.trim().is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(ParsedToken {
            expired: data.claims.exp <= now,
            claims: data.claims,
        })
    }
}

/// True when the header segment decodes and names an `alg` other than HS256,
/// including names the JWT library has no variant for (`none`).
fn declares_foreign_algorithm(token: &str) -> bool {
    let Some(segment) = token.split('.').next() else {
        return false;
    };
    URL_SAFE_NO_PAD
        .decode(segment)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .and_then(|header| header.get("alg")?.as_str().map(|alg| alg != "HS256"))
        .unwrap_or(false)
}

/// Token-level failures. Never surfaced to HTTP clients directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong segment count, bad base64/JSON, or required claims missing
    Malformed,
    /// Signature verified but the expiry has passed
    Expired,
    /// Header names an algorithm other than HS256
    UnsupportedAlgorithm,
    /// Signature does not match the payload under our key
    BadSignature,
    /// Error encoding the token
    Encoding(String),
    /// Issue time plus lifetime does not fit a timestamp
    ExpiryOutOfRange,
    /// System clock before the Unix epoch
    Clock,
}

impl TokenError {
    fn from_kind(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Malformed token"),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::UnsupportedAlgorithm => write!(f, "Unsupported signing algorithm"),
            TokenError::BadSignature => write!(f, "Token signature mismatch"),
            TokenError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            TokenError::ExpiryOutOfRange => write!(f, "Token expiry out of range"),
            TokenError::Clock => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for TokenError {}
