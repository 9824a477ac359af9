//! In-memory service fakes shared by unit tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use menfess_oauth::{Token, TokenSource};
use tokio::time::Instant;

use crate::filter::RequestDescriptor;
use crate::message::{MessageRecord, TrackMetadata};
use crate::service::{EnrichError, SearchError, SearchResponse, SearchService, TrackService};

pub fn record(id: i64, track: Option<&str>) -> MessageRecord {
    MessageRecord {
        id,
        sender: format!("sender-{id}"),
        recipient: "Dinda".to_string(),
        message: format!("message {id}"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        external_track_id: track.map(str::to_string),
    }
}

pub fn track(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        artist: "Artist".to_string(),
        cover_image_url: "https://img/cover".to_string(),
        preview_url: None,
    }
}

pub fn response(ids: &[i64], total_pages: u32, total_items: u64) -> SearchResponse {
    SearchResponse {
        data: ids.iter().map(|id| record(*id, None)).collect(),
        total_pages,
        total_items,
    }
}

/// Search service answering from a script of `(delay, outcome)` pairs.
#[derive(Default)]
pub struct ScriptedSearch {
    script: Mutex<VecDeque<(Duration, Result<SearchResponse, SearchError>)>>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedSearch {
    pub fn push(&self, delay: Duration, outcome: Result<SearchResponse, SearchError>) {
        self.script.lock().unwrap().push_back((delay, outcome));
    }

    /// Queues a search that never answers.
    pub fn push_hang(&self) {
        self.push(Duration::MAX, Ok(response(&[], 0, 0)));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(RequestDescriptor::to_query_string)
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl SearchService for ScriptedSearch {
    async fn search(&self, request: &RequestDescriptor) -> Result<SearchResponse, SearchError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        let (delay, outcome) = next.unwrap_or((Duration::ZERO, Ok(response(&[], 0, 0))));
        if delay == Duration::MAX {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(delay).await;
        outcome
    }
}

/// Track service answering from a fixed table; unknown ids get a 404.
#[derive(Default)]
pub struct TableTracks {
    table: HashMap<String, Result<TrackMetadata, u16>>,
    calls: AtomicUsize,
}

impl TableTracks {
    #[must_use]
    pub fn with(mut self, id: &str, outcome: Result<TrackMetadata, u16>) -> Self {
        self.table.insert(id.to_string(), outcome);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TrackService for TableTracks {
    async fn fetch_track(&self, _token: &str, track_id: &str) -> Result<TrackMetadata, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        match self.table.get(track_id) {
            Some(Ok(track)) => Ok(track.clone()),
            Some(Err(status)) => Err(EnrichError::Status(*status)),
            None => Err(EnrichError::Status(404)),
        }
    }
}

/// Token source counting how often it is asked.
#[derive(Default)]
pub struct CountingTokens {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingTokens {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenSource for CountingTokens {
    async fn fetch_token(&self) -> menfess_oauth::Result<Token> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        if self.fail {
            return Err(menfess_oauth::Error::oauth_error("invalid_client", "rejected"));
        }
        Ok(Token::new(
            format!("token-{n}"),
            "Bearer",
            Instant::now() + Duration::from_secs(3540),
        ))
    }
}
