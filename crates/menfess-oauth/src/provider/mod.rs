//! Track-metadata provider configurations.

use crate::error::{Error, Result};
use url::Url;

/// `OAuth2` provider configuration.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Provider name (e.g., "Spotify").
    pub name: String,
    /// Token endpoint URL.
    pub token_url: Url,
    /// Base URL of the provider's web API.
    pub api_url: Url,
}

impl Provider {
    /// Creates a new provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if URLs are invalid.
    pub fn new(
        name: impl Into<String>,
        token_url: impl AsRef<str>,
        api_url: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            token_url: Url::parse(token_url.as_ref())?,
            api_url: Url::parse(api_url.as_ref())?,
        })
    }

    /// Spotify Web API provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if URL parsing fails.
    pub fn spotify() -> Result<Self> {
        Self::new(
            "Spotify",
            "https://accounts.spotify.com/api/token",
            "https://api.spotify.com/v1",
        )
    }

    /// URL of a single track resource, `<api_url>/tracks/<id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL cannot hold path segments.
    pub fn track_url(&self, track_id: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidConfig(format!("{} API URL cannot be a base", self.name))
            })?
            .pop_if_empty()
            .push("tracks")
            .push(track_id);
        Ok(url)
    }

    /// Validates that URLs use HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        for url in [&self.token_url, &self.api_url] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::InvalidConfig(format!(
                    "{} URL must be http(s): {url}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}
