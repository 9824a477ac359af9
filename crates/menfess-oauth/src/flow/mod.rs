//! `OAuth2` authorization flows.

mod client_credentials;

pub use client_credentials::ClientCredentialsFlow;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::token::{ErrorResponse, Token, TokenResponse};
use reqwest::Client;
use tokio::time::Instant;
use tracing::debug;

/// Common `OAuth2` client configuration.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Client ID from provider.
    pub client_id: String,
    /// Client secret.
    pub client_secret: Option<String>,
    /// Provider configuration.
    pub provider: Provider,
    /// HTTP client.
    http_client: Client,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            provider,
            http_client: Client::new(),
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Uses the given HTTP client instead of a fresh one.
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Returns the client id and secret, or the one that is missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingCredentials` if either value is absent or blank.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        if self.client_id.trim().is_empty() {
            return Err(Error::MissingCredentials("client id"));
        }
        let secret = self
            .client_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(Error::MissingCredentials("client secret"))?;
        Ok((&self.client_id, secret))
    }

    /// Requests an app token with the client-credentials grant.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the request fails, or
    /// the server answers with a non-success status or malformed body.
    pub(crate) async fn request_client_credentials(&self) -> Result<Token> {
        let (client_id, secret) = self.credentials()?;

        debug!(provider = %self.provider.name, "requesting client-credentials token");

        let response = self
            .http_client
            .post(self.provider.token_url.clone())
            .basic_auth(client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(serde_json::from_str::<ErrorResponse>(&body).map_or_else(
                |_| Error::oauth_error(status.as_str(), body.trim()),
                ErrorResponse::into_error,
            ));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)?;
        Token::from_response(token_response, Instant::now())
    }
}
