//! Track-metadata enrichment of search results.
//!
//! Enrichment is best effort: a record either gains a [`TrackMetadata`] or
//! comes back exactly as it went in. Failures are logged and never reach the
//! page status.

use std::sync::Arc;

use futures_util::future::join_all;
use menfess_oauth::{TokenCache, TokenSource};
use tracing::{debug, warn};

use crate::message::{EnrichedRecord, MessageRecord, TrackMetadata};
use crate::service::{EnrichError, TrackService};

/// Attaches track metadata to records that reference a track.
#[derive(Debug)]
pub struct MetadataEnricher<T, S> {
    tracks: T,
    tokens: Arc<TokenCache<S>>,
}

impl<T: TrackService, S: TokenSource> MetadataEnricher<T, S> {
    /// Creates an enricher sharing `tokens` with any other users of the cache.
    #[must_use]
    pub const fn new(tracks: T, tokens: Arc<TokenCache<S>>) -> Self {
        Self { tracks, tokens }
    }

    /// Returns the shared token cache.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenCache<S>> {
        &self.tokens
    }

    /// Returns the track service.
    #[must_use]
    pub const fn tracks(&self) -> &T {
        &self.tracks
    }

    /// Enriches one record.
    ///
    /// Records without a track id are returned immediately without touching
    /// the token cache or the network.
    pub async fn enrich(&self, record: MessageRecord) -> EnrichedRecord {
        let Some(track_id) = record.track_id() else {
            return EnrichedRecord::plain(record);
        };

        let outcome = self.lookup(track_id).await;
        match outcome {
            Ok(track) => EnrichedRecord::with_track(record, track),
            Err(e) => {
                warn!(record = record.id, "track metadata skipped: {e}");
                EnrichedRecord::plain(record)
            }
        }
    }

    /// Enriches every record concurrently, preserving order.
    ///
    /// Completes once every lookup has settled.
    pub async fn enrich_page(&self, records: Vec<MessageRecord>) -> Vec<EnrichedRecord> {
        let lookups = records.iter().filter(|r| r.track_id().is_some()).count();
        debug!(records = records.len(), lookups, "enriching page");
        join_all(records.into_iter().map(|record| self.enrich(record))).await
    }

    /// Looks up one track, surfacing the error.
    ///
    /// A 401 from the provider drops the cached token so the next lookup
    /// refreshes it.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be obtained or the lookup fails.
    pub async fn lookup(&self, track_id: &str) -> Result<TrackMetadata, EnrichError> {
        let token = self.tokens.get_token().await?;
        let result = self.tracks.fetch_track(&token, track_id).await;
        if let Err(e) = &result {
            if e.is_unauthorized() {
                debug!("provider rejected access token, invalidating");
                self.tokens.invalidate().await;
            }
        }
        result
    }
}
