//! Runtime configuration.
//!
//! Values come from an optional JSON file in the user config directory and
//! are then overridden by environment variables.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use menfess_oauth::{OAuthClient, Provider};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::filter::DEFAULT_PAGE_SIZE;

/// Search service base URL.
pub const ENV_SEARCH_URL: &str = "MENFESS_SEARCH_URL";
/// Records per page.
pub const ENV_PAGE_SIZE: &str = "MENFESS_PAGE_SIZE";
/// Debounce delay in milliseconds.
pub const ENV_DEBOUNCE_MS: &str = "MENFESS_DEBOUNCE_MS";
/// Metadata provider client id.
pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
/// Metadata provider client secret.
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
/// Metadata provider token endpoint.
pub const ENV_TOKEN_URL: &str = "SPOTIFY_TOKEN_URL";
/// Metadata provider web API base URL.
pub const ENV_API_URL: &str = "SPOTIFY_API_URL";

/// Default debounce delay in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Default debounce delay.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(DEFAULT_DEBOUNCE_MS);

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search service endpoint.
    pub search_url: String,
    /// Metadata provider client id.
    pub client_id: Option<String>,
    /// Metadata provider client secret.
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    /// Metadata provider token endpoint.
    pub token_url: String,
    /// Metadata provider web API base URL.
    pub track_api_url: String,
    /// Records per page.
    pub page_size: u32,
    /// Debounce delay in milliseconds.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_url: "http://localhost:3000/api/menfess".to_string(),
            client_id: None,
            client_secret: None,
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            track_api_url: "https://api.spotify.com/v1".to_string(),
            page_size: DEFAULT_PAGE_SIZE.get(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl Config {
    /// Default config file location, `<config_dir>/menfess/config.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("menfess").join("config.json"))
    }

    /// Loads the config file (if present) and applies the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or an
    /// environment value is invalid.
    pub fn load() -> Result<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Reads a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config file");
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Overrides fields from an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_SEARCH_URL) {
            self.search_url = url;
        }
        if let Some(id) = get(ENV_CLIENT_ID) {
            self.client_id = Some(id);
        }
        if let Some(secret) = get(ENV_CLIENT_SECRET) {
            self.client_secret = Some(secret);
        }
        if let Some(url) = get(ENV_TOKEN_URL) {
            self.token_url = url;
        }
        if let Some(url) = get(ENV_API_URL) {
            self.track_api_url = url;
        }
        if let Some(size) = get(ENV_PAGE_SIZE) {
            self.page_size = size
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_PAGE_SIZE} must be a number: {size}")))?;
        }
        if let Some(ms) = get(ENV_DEBOUNCE_MS) {
            self.debounce_ms = ms
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{ENV_DEBOUNCE_MS} must be a number: {ms}")))?;
        }
        Ok(self)
    }

    /// Checks everything needed to run a search.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero page size or an unusable URL.
    pub fn validate(&self) -> Result<()> {
        self.search_url()?;
        self.provider()?;
        if self.page_size == 0 {
            return Err(Error::Config("page size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Checks that metadata provider credentials are present.
    ///
    /// Missing credentials disable enrichment but not search.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the missing variable.
    pub fn check_credentials(&self) -> Result<()> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.client_id) {
            return Err(Error::Config(format!("{ENV_CLIENT_ID} is not set")));
        }
        if !present(&self.client_secret) {
            return Err(Error::Config(format!("{ENV_CLIENT_SECRET} is not set")));
        }
        Ok(())
    }

    /// Parsed search service URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn search_url(&self) -> Result<Url> {
        let url = Url::parse(&self.search_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "search URL must be http(s): {url}"
            )));
        }
        Ok(url)
    }

    /// Metadata provider described by this config.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider URL is invalid.
    pub fn provider(&self) -> Result<Provider> {
        let provider = Provider::new("Spotify", &self.token_url, &self.track_api_url)?;
        provider.validate()?;
        Ok(provider)
    }

    /// `OAuth2` client for the metadata provider. Credentials may be absent;
    /// token requests then fail with a configuration error.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider URL is invalid.
    pub fn oauth_client(&self, http_client: reqwest::Client) -> Result<OAuthClient> {
        let mut client = OAuthClient::new(self.client_id.clone().unwrap_or_default(), self.provider()?)
            .with_http_client(http_client);
        if let Some(secret) = &self.client_secret {
            client = client.with_client_secret(secret.clone());
        }
        Ok(client)
    }

    /// Records per page, falling back to the default for zero.
    #[must_use]
    pub fn page_size(&self) -> NonZeroU32 {
        NonZeroU32::new(self.page_size).unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Debounce delay.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
