//! Authentication module
//!
//! Supports: static access token, OAuth2 client credentials
//!
//! Podbean issues short-lived access tokens from `/v1/oauth/token` using the
//! app's client id and secret. The `Authenticator` caches the token and
//! refreshes it shortly before it expires.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, Location, ACCESS_TOKEN_PARAM};
