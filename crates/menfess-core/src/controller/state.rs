//! Published controller state.

use serde::Serialize;

use crate::filter::FilterState;
use crate::message::Page;

/// Where the controller is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A filter change is waiting for the debounce delay.
    Debouncing,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded.
    Success,
    /// The latest request failed.
    Error,
}

/// A committed page together with the filter that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    /// The page.
    pub page: Page,
    /// Filter the page was requested with.
    pub filter: FilterState,
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SearchState {
    /// Current status.
    pub status: SearchStatus,
    /// Filter as currently set by the user.
    pub filter: FilterState,
    /// Last committed results; kept across errors.
    pub results: Option<SearchResults>,
    /// Cause of the last failure, cleared by the next success.
    pub error: Option<String>,
}

impl SearchState {
    /// The last committed page, if any.
    #[must_use]
    pub fn page(&self) -> Option<&Page> {
        self.results.as_ref().map(|r| &r.page)
    }

    /// True while a request is pending or about to be sent.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.status, SearchStatus::Debouncing | SearchStatus::Loading)
    }

    /// True if the displayed results match the current filter.
    #[must_use]
    pub fn results_are_current(&self) -> bool {
        self.results.as_ref().is_some_and(|r| r.filter == self.filter)
    }
}
