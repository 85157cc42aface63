//! Access/refresh token pair issuance.

use serde::Serialize;

use super::codec::{Claims, TokenCodec, TokenError};
use super::key::TokenTtl;
use super::now_secs;
use crate::db::User;

/// Token type label returned to clients.
pub const TOKEN_TYPE: &str = "Bearer";

/// Access and refresh tokens minted together for one principal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token_type: &'static str,
    pub access_token: String,
    pub refresh_token: String,
}

/// A single access token plus its lifetime, for the refresh exchange.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: u64,
    pub duration: u64,
}

/// Builds claim sets for a principal and signs them.
pub struct TokenIssuer<'a> {
    codec: &'a TokenCodec,
    ttl: TokenTtl,
}

impl<'a> TokenIssuer<'a> {
    pub(super) fn new(codec: &'a TokenCodec, ttl: TokenTtl) -> Self {
        Self { codec, ttl }
    }

    /// Issue an access/refresh pair for `user` using the current clock.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        self.issue_at(user, now_secs()?)
    }

    /// Issue an access/refresh pair as if the clock read `now` (Unix seconds).
    pub fn issue_at(&self, user: &User, now: u64) -> Result<TokenPair, TokenError> {
        let access = self.codec.sign(&access_claims(user, now, self.ttl.access_secs())?)?;
        let refresh = self.codec.sign(&Claims {
            sub: user.email.clone(),
            auth: None,
            iat: now,
            exp: expiry(now, self.ttl.refresh_secs())?,
        })?;

        Ok(TokenPair {
            token_type: TOKEN_TYPE,
            access_token: access,
            refresh_token: refresh,
        })
    }

    /// Issue only an access token. The refresh exchange never mints a new refresh token.
    pub fn issue_access_at(&self, user: &User, now: u64) -> Result<AccessToken, TokenError> {
        let duration = self.ttl.access_secs();
        let claims = access_claims(user, now, duration)?;
        let expires_at = claims.exp;
        Ok(AccessToken {
            token: self.codec.sign(&claims)?,
            expires_at,
            duration,
        })
    }
}

fn access_claims(user: &User, now: u64, ttl: u64) -> Result<Claims, TokenError> {
    Ok(Claims {
        sub: user.email.clone(),
        auth: Some(user.role.authorities().join(",")),
        iat: now,
        exp: expiry(now, ttl)?,
    })
}

fn expiry(now: u64, ttl: u64) -> Result<u64, TokenError> {
    now.checked_add(ttl).ok_or(TokenError::ExpiryOutOfRange)
}
