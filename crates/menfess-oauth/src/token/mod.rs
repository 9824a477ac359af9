//! `OAuth2` token types and expiry handling.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Tokens are treated as expired this long before the provider says so.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Bearer access token with its local expiry instant.
///
/// `expires_at` already has [`EXPIRY_MARGIN`] subtracted, so a token is
/// usable exactly while `now < expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Access token string.
    pub access_token: String,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Instant after which the token must be refreshed.
    pub expires_at: Instant,
}

impl Token {
    /// Creates a token that expires at the given instant.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: Instant,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at,
        }
    }

    /// Creates a token from a token response received at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the response carries an empty access token.
    pub fn from_response(response: TokenResponse, issued_at: Instant) -> Result<Self> {
        if response.access_token.trim().is_empty() {
            return Err(Error::InvalidResponse("empty access_token".to_string()));
        }

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);

        Ok(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at: issued_at + lifetime,
        })
    }

    /// Checks if the token is expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Checks if the token is expired now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Returns true if the token is valid (not expired).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

/// Token response from `OAuth2` server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error response from `OAuth2` server.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,
    /// Error description.
    #[serde(default)]
    pub error_description: String,
}

impl ErrorResponse {
    /// Converts to an Error.
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::oauth_error(self.error, self.error_description)
    }
}
