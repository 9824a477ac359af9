//! Client Credentials Grant (RFC 6749 section 4.4).

use super::OAuthClient;
use crate::cache::TokenSource;
use crate::error::Result;
use crate::token::Token;

/// Client-credentials flow for app-only access tokens.
///
/// No user is involved: the client id and secret are exchanged directly
/// for a short-lived bearer token.
#[derive(Debug, Clone)]
pub struct ClientCredentialsFlow {
    client: OAuthClient,
}

impl ClientCredentialsFlow {
    /// Creates a new client-credentials flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }
}

impl TokenSource for ClientCredentialsFlow {
    async fn fetch_token(&self) -> Result<Token> {
        self.client.request_client_credentials().await
    }
}
