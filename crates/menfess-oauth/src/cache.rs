//! Cached access token with single-flight refresh.
//!
//! A [`TokenCache`] owns exactly one credential. Callers share it through an
//! `Arc`; the first caller that finds the credential missing or expired
//! performs the refresh while every other caller waits on the same lock and
//! then reads the refreshed value.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::token::Token;

/// Something that can mint a fresh access token.
pub trait TokenSource: Send + Sync {
    /// Requests a new token from the provider.
    fn fetch_token(&self) -> impl Future<Output = Result<Token>> + Send;
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<Token>,
    last_failure: Option<String>,
}

/// Process-wide holder of one bearer credential.
#[derive(Debug)]
pub struct TokenCache<S> {
    source: S,
    slot: Mutex<Slot>,
    /// Number of refresh attempts that have finished, successful or not.
    attempts: AtomicU64,
}

impl<S: TokenSource> TokenCache<S> {
    /// Creates an empty cache backed by `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::default()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Returns the token source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns a valid access token, refreshing it if needed.
    ///
    /// Callers that queued behind a refresh which failed receive
    /// `Error::RefreshFailed` instead of issuing another request.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the refresh fails.
    pub async fn get_token(&self) -> Result<String> {
        let observed = self.attempts.load(Ordering::Acquire);
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.token.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        if self.attempts.load(Ordering::Acquire) != observed {
            if let Some(reason) = &slot.last_failure {
                return Err(Error::RefreshFailed(reason.clone()));
            }
        }

        debug!("access token missing or expired, refreshing");
        let outcome = self.source.fetch_token().await;
        self.attempts.fetch_add(1, Ordering::Release);

        match outcome {
            Ok(token) => {
                let access_token = token.access_token.clone();
                slot.token = Some(token);
                slot.last_failure = None;
                Ok(access_token)
            }
            Err(e) => {
                warn!("access token refresh failed: {e}");
                slot.token = None;
                slot.last_failure = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drops the cached token so the next caller refreshes.
    pub async fn invalidate(&self) {
        self.slot.lock().await.token = None;
    }

    /// Returns a copy of the cached token, valid or not.
    pub async fn cached(&self) -> Option<Token> {
        self.slot.lock().await.token.clone()
    }
}
