//! Client for the track-metadata provider.

use std::future::Future;
use std::sync::Arc;

use menfess_oauth::Provider;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::message::TrackMetadata;

/// Errors while enriching a record. Always absorbed by the enricher.
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Client credentials are not configured.
    #[error("Configuration error: {0}")]
    Configuration(menfess_oauth::Error),

    /// Token endpoint unreachable or rejected the credentials.
    #[error("Credential error: {0}")]
    Credential(menfess_oauth::Error),

    /// Lookup request failed.
    #[error("Track lookup failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("Track service returned {0}")]
    Status(u16),

    /// Payload did not have the expected shape.
    #[error("Malformed track payload: {0}")]
    Malformed(String),
}

impl From<menfess_oauth::Error> for EnrichError {
    fn from(e: menfess_oauth::Error) -> Self {
        if e.is_configuration() {
            Self::Configuration(e)
        } else {
            Self::Credential(e)
        }
    }
}

impl EnrichError {
    /// True if the provider rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status(401))
    }
}

/// Anything that can look up one track.
pub trait TrackService: Send + Sync + 'static {
    /// Fetches normalized metadata for `track_id` using `token`.
    fn fetch_track(
        &self,
        token: &str,
        track_id: &str,
    ) -> impl Future<Output = Result<TrackMetadata, EnrichError>> + Send;
}

impl<T: TrackService> TrackService for Arc<T> {
    fn fetch_track(
        &self,
        token: &str,
        track_id: &str,
    ) -> impl Future<Output = Result<TrackMetadata, EnrichError>> + Send {
        (**self).fetch_track(token, track_id)
    }
}

#[derive(Debug, Deserialize)]
struct TrackPayload {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistPayload>,
    #[serde(default)]
    album: Option<AlbumPayload>,
    #[serde(default)]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumPayload {
    #[serde(default)]
    images: Vec<ImagePayload>,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    url: String,
}

impl From<TrackPayload> for TrackMetadata {
    fn from(payload: TrackPayload) -> Self {
        let artist = payload
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let cover_image_url = payload
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url)
            .unwrap_or_default();

        Self {
            title: payload.name,
            artist,
            cover_image_url,
            preview_url: payload.preview_url.filter(|url| !url.is_empty()),
        }
    }
}

/// Parses and normalizes a provider track object.
///
/// # Errors
///
/// Returns `EnrichError::Malformed` if the body is not a track.
pub fn parse_track(body: &str) -> Result<TrackMetadata, EnrichError> {
    serde_json::from_str::<TrackPayload>(body)
        .map(TrackMetadata::from)
        .map_err(|e| EnrichError::Malformed(e.to_string()))
}

/// HTTP implementation of [`TrackService`].
#[derive(Debug, Clone)]
pub struct HttpTrackService {
    provider: Provider,
    http_client: Client,
}

impl HttpTrackService {
    /// Creates a client for the provider's web API.
    #[must_use]
    pub const fn new(provider: Provider, http_client: Client) -> Self {
        Self {
            provider,
            http_client,
        }
    }
}

impl TrackService for HttpTrackService {
    async fn fetch_track(&self, token: &str, track_id: &str) -> Result<TrackMetadata, EnrichError> {
        let url = self.provider.track_url(track_id)?;
        debug!(%url, "fetching track metadata");

        let response = self.http_client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(EnrichError::Status(status.as_u16()));
        }

        parse_track(&response.text().await?)
    }
}
