//! Client for the remote menfess search service.

use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::filter::RequestDescriptor;
use crate::message::MessageRecord;

/// Errors from the search service. These are the only failures the end
/// user sees.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Service unreachable or the connection failed.
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("Search service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, trimmed.
        body: String,
    },

    /// Payload did not have the expected shape.
    #[error("Malformed search response: {0}")]
    Malformed(String),
}

/// Raw page as returned by the search service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Records on this page.
    pub data: Vec<MessageRecord>,
    /// Total pages for the query.
    pub total_pages: u32,
    /// Total matching records.
    pub total_items: u64,
}

/// Anything that can answer a search request.
pub trait SearchService: Send + Sync + 'static {
    /// Runs one search.
    fn search(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send;
}

impl<T: SearchService> SearchService for Arc<T> {
    fn search(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
        (**self).search(request)
    }
}

/// HTTP implementation of [`SearchService`].
#[derive(Debug, Clone)]
pub struct HttpSearchService {
    base_url: Url,
    http_client: Client,
}

impl HttpSearchService {
    /// Creates a client for the service at `base_url`.
    #[must_use]
    pub const fn new(base_url: Url, http_client: Client) -> Self {
        Self {
            base_url,
            http_client,
        }
    }

    /// Full request URL for a descriptor.
    #[must_use]
    pub fn request_url(&self, request: &RequestDescriptor) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(Some(&request.to_query_string()));
        url
    }
}

impl SearchService for HttpSearchService {
    async fn search(&self, request: &RequestDescriptor) -> Result<SearchResponse, SearchError> {
        let url = self.request_url(request);
        debug!(%url, "searching menfess");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        parse_response(&body)
    }
}

/// Parses a search response body.
///
/// # Errors
///
/// Returns `SearchError::Malformed` if the body is not a search page.
pub fn parse_response(body: &str) -> Result<SearchResponse, SearchError> {
    serde_json::from_str(body).map_err(|e| SearchError::Malformed(e.to_string()))
}
