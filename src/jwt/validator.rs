//! Authorization decision over a presented token.

use super::codec::{Claims, TokenCodec, TokenError};
use super::now_secs;

/// Decides whether a token is currently acceptable.
///
/// Pure over the signing key and the token bytes; safe to call from any number
/// of request tasks at once.
pub struct TokenValidator<'a> {
    codec: &'a TokenCodec,
}

impl<'a> TokenValidator<'a> {
    pub(super) fn new(codec: &'a TokenCodec) -> Self {
        Self { codec }
    }

    /// True iff the signature verifies, the subject is present and expiry is in the future.
    pub fn is_valid(&self, token: &str) -> bool {
        self.validate(token).is_ok()
    }

    pub fn is_valid_at(&self, token: &str, now: u64) -> bool {
        self.validate_at(token, now).is_ok()
    }

    /// Same decision as `is_valid`, keeping the claims and the failure kind.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, now_secs()?)
    }

    pub fn validate_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let parsed = self.codec.parse_at(token, now)?;
        if parsed.expired {
            return Err(TokenError::Expired);
        }
        Ok(parsed.claims)
    }

    /// Subject of a correctly signed token, expired or not.
    ///
    /// For diagnostics on the refresh path only. Never grants authorization.
    pub fn subject_even_if_expired(&self, token: &str) -> Result<String, TokenError> {
        let parsed = self.codec.parse_at(token, now_secs()?)?;
        Ok(parsed.claims.sub)
    }
}
