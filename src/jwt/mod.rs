//! JWT token generation and validation.
//!
//! Stateless dual-token scheme: short-lived access tokens (default 1 hour)
//! carry the user's authorities, long-lived refresh tokens (default 30 days)
//! carry only the subject and are exchanged for new access tokens. Nothing is
//! stored server-side beyond the signing key.

mod codec;
mod issuer;
mod key;
mod validator;

use std::time::{SystemTime, UNIX_EPOCH};

pub use codec::{Claims, ParsedToken, TokenCodec, TokenError};
pub use issuer::{AccessToken, TOKEN_TYPE, TokenIssuer, TokenPair};
pub use key::{
    DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS, KeyError, MAX_TTL_SECS, MIN_KEY_BYTES,
    SigningKey, TokenTtl, TtlError,
};
pub use validator::TokenValidator;

/// Current Unix time in seconds.
pub fn now_secs() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::Clock)
}

/// Configuration for JWT operations: the signing codec and token lifetimes.
#[derive(Clone)]
pub struct JwtConfig {
    codec: TokenCodec,
    ttl: TokenTtl,
}

impl JwtConfig {
    pub fn new(key: &SigningKey, ttl: TokenTtl) -> Self {
        Self {
            codec: TokenCodec::new(key),
            ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn ttl(&self) -> TokenTtl {
        self.ttl
    }

    pub fn issuer(&self) -> TokenIssuer<'_> {
        TokenIssuer::new(&self.codec, self.ttl)
    }

    pub fn validator(&self) -> TokenValidator<'_> {
        TokenValidator::new(&self.codec)
    }
}
