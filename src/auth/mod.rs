//! Token-based authentication.
//!
//! Stateless dual-token system: access tokens travel in the `Authorization`
//! header or the `access_token` cookie, refresh tokens in a cookie scoped to
//! the refresh endpoint (or a request body). A federated login creates the
//! local user and sets both cookies; the filter resolves every request to a
//! user or to nobody.

mod cookie;
mod errors;
mod federated;
mod filter;
mod refresh;
mod resolver;
mod state;

pub use cookie::{ACCESS_COOKIE_NAME, CookiePolicy, REFRESH_COOKIE_NAME, get_cookie};
pub use errors::AuthError;
pub use federated::{
    FederatedIdentity, FederatedLogin, FederatedLoginBridge, FederatedProfile, UserInfoClaims,
};
pub use filter::{AdminOnly, Auth, CurrentUser, OptionalAuth, authenticate};
pub use refresh::{RefreshExchange, RefreshedAccess};
pub use resolver::{
    DEFAULT_EXTRACTORS, IdentityResolver, TokenExtractor, access_cookie_token, bearer_token,
};
pub use state::{AuthBackend, HasAuthBackend};
