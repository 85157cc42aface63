//! Federated (OAuth2/OIDC) login bridged into our own tokens.
//!
//! The provider handshake happens elsewhere. Whatever performed it hands us a
//! `FederatedIdentity`; from there the bridge upserts the local user and issues
//! a token pair. Provider specifics stop at the attribute mapping.

use serde_json::{Map, Value};
use tracing::info;

use super::errors::AuthError;
use super::state::HasAuthBackend;
use crate::db::{User, normalize_email};
use crate::jwt::TokenPair;

/// Attributes the bridge needs from an external identity provider.
pub trait FederatedIdentity {
    fn email(&self) -> Option<&str>;
    fn name(&self) -> Option<&str>;
    fn picture_url(&self) -> Option<&str>;
}

/// Provider-neutral profile, placed in request extensions by the handshake layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FederatedProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture_url: Option<String>,
}

/// Raw user-info claims from the provider, for handshake layers that do not
/// build a `FederatedProfile` themselves.
#[derive(Debug, Clone, Default)]
pub struct UserInfoClaims(pub Map<String, Value>);

impl FederatedProfile {
    /// Map a provider's user-info claims. Understands OIDC (`picture`) and
    /// GitHub-style (`avatar_url`, `login`) attribute names.
    pub fn from_claims(claims: &Map<String, Value>) -> Self {
        let text = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| claims.get(*k).and_then(Value::as_str))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            email: text(&["email"]),
            name: text(&["name", "login"]),
            picture_url: text(&["picture", "avatar_url"]),
        }
    }
}

impl FederatedIdentity for FederatedProfile {
    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn picture_url(&self) -> Option<&str> {
        self.picture_url.as_deref()
    }
}

/// A completed login: the stored user and the tokens to hand to the client.
#[derive(Debug, Clone)]
pub struct FederatedLogin {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct FederatedLoginBridge<'a, S> {
    state: &'a S,
}

impl<'a, S> FederatedLoginBridge<'a, S>
where
    S: HasAuthBackend + Sync,
{
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Upsert the local user for `identity` and issue a token pair.
    ///
    /// Fails with `MissingEmailAttribute` before touching storage when the
    /// provider supplied no usable email.
    pub async fn complete<I>(&self, identity: &I) -> Result<FederatedLogin, AuthError>
    where
        I: FederatedIdentity + Sync + ?Sized,
    {
        let email = identity
            .email()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingEmailAttribute)?;

        let name = identity
            .name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| display_name_from_email(&email));

        let user = self
            .state
            .db()
            .users()
            .upsert_federated(&email, &name, identity.picture_url())
            .await
            .map_err(|e| AuthError::storage("Failed to upsert user", e))?;

        let tokens = self
            .state
            .jwt()
            .issuer()
            .issue(&user)
            .map_err(AuthError::token_issue)?;

        info!(subject = %user.email, uuid = %user.uuid, "Federated login completed");
        Ok(FederatedLogin { user, tokens })
    }
}

fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
