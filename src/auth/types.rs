//! Auth configuration types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameter Podbean reads the access token from
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Where the access token is placed on outgoing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// `?access_token=...` query parameter
    #[default]
    Query,
    /// `Authorization: Bearer ...` header
    Header,
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// A pre-issued access token
    AccessToken {
        /// The token value
        token: String,
        /// Where to place the token
        location: Location,
    },

    /// OAuth2 Client Credentials flow
    ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Where to place the issued token
        location: Location,
    },
}

impl AuthConfig {
    /// Token placement for this config (None for no auth)
    pub fn location(&self) -> Option<Location> {
        match self {
            AuthConfig::None => None,
            AuthConfig::AccessToken { location, .. }
            | AuthConfig::ClientCredentials { location, .. } => Some(*location),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
