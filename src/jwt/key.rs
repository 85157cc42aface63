//! Signing key and token lifetime configuration.

use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use std::time::Duration;

/// Minimum signing key length in bytes (256 bits).
pub const MIN_KEY_BYTES: usize = 32;

/// Default access token lifetime: 1 hour.
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 60 * 60;

/// Default refresh token lifetime: 30 days.
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Upper bound for either lifetime: 10 years.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// HMAC key material. Loaded once at startup, never mutated.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl SigningKey {
    /// Decode a base64 key (standard or URL-safe alphabet, padding optional).
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let encoded = encoded.trim();
        let bytes = STANDARD_LENIENT
            .decode(encoded)
            .or_else(|_| URL_SAFE_LENIENT.decode(encoded))
            .map_err(|_| KeyError::InvalidBase64)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, KeyError> {
        if bytes.len() < MIN_KEY_BYTES {
            return Err(KeyError::TooShort(bytes.len()));
        }
        Ok(Self { bytes })
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Errors loading the signing key.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyError {
    /// The configured value is not base64
    InvalidBase64,
    /// Decoded key is shorter than 256 bits (carries the actual byte length)
    TooShort(usize),
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::InvalidBase64 => write!(f, "Signing key is not valid base64"),
            KeyError::TooShort(len) => write!(
                f,
                "Signing key is {} bytes, at least {} are required",
                len, MIN_KEY_BYTES
            ),
        }
    }
}

impl std::error::Error for KeyError {}

/// Access and refresh token lifetimes.
///
/// Access must be strictly shorter than refresh, otherwise refreshing is pointless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    access: Duration,
    refresh: Duration,
}

impl TokenTtl {
    pub fn new(access: Duration, refresh: Duration) -> Result<Self, TtlError> {
        if access.as_secs() == 0 || refresh.as_secs() == 0 {
            return Err(TtlError::Zero);
        }
        if access.as_secs() > MAX_TTL_SECS || refresh.as_secs() > MAX_TTL_SECS {
            return Err(TtlError::TooLong);
        }
        if access >= refresh {
            return Err(TtlError::AccessNotShorter);
        }
        Ok(Self { access, refresh })
    }

    pub fn from_secs(access: u64, refresh: u64) -> Result<Self, TtlError> {
        Self::new(Duration::from_secs(access), Duration::from_secs(refresh))
    }

    pub fn access_secs(&self) -> u64 {
        self.access.as_secs()
    }

    pub fn refresh_secs(&self) -> u64 {
        self.refresh.as_secs()
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: Duration::from_secs(DEFAULT_ACCESS_TTL_SECS),
            refresh: Duration::from_secs(DEFAULT_REFRESH_TTL_SECS),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TtlError {
    Zero,
    TooLong,
    AccessNotShorter,
}

impl std::fmt::Display for TtlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtlError::Zero => write!(f, "Token lifetimes must be at least one second"),
            TtlError::TooLong => {
                write!(f, "Token lifetimes must not exceed {} seconds", MAX_TTL_SECS)
            }
            TtlError::AccessNotShorter => {
                write!(f, "Access token lifetime must be shorter than refresh lifetime")
            }
        }
    }
}

impl std::error::Error for TtlError {}
