//! Authentication state traits and macro.

use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;

/// Trait for state types that provide the user directory and JWT access.
pub trait HasAuthBackend {
    fn jwt(&self) -> &JwtConfig;
    fn db(&self) -> &Database;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `jwt: Arc<JwtConfig>`
/// - `db: Database`
///
/// # Example
/// ```ignore
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub jwt: Arc<JwtConfig>,
/// }
///
/// wordhoard::impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn db(&self) -> &$crate::db::Database {
                &self.db
            }
        }
    };
}

/// Minimal state for the authentication filter.
#[derive(Clone)]
pub struct AuthBackend {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

crate::impl_has_auth_backend!(AuthBackend);
