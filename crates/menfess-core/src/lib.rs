//! # menfess-core
//!
//! Search, enrichment and query control for the menfess message browser.
//!
//! This crate provides:
//! - **Filter model** - search field, term, date, sort order and pagination
//! - **Query builder** - deterministic request parameters for the search service
//! - **Metadata enrichment** - music track details attached to message records
//! - **Search controller** - debounced, out-of-order-safe search orchestration
//! - **Configuration** - config file plus environment overrides
//!
//! ## Quick Start
//!
//! ```ignore
//! use menfess_core::{Config, FilterUpdate, HttpSearchController};
//!
//! let config = Config::load()?;
//! let controller = HttpSearchController::from_config(&config)?;
//! let mut updates = controller.subscribe();
//!
//! controller.on_filter_change(FilterUpdate::term("Dinda"))?;
//! let state = updates.wait_for(|s| !s.is_busy()).await?.clone();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod enrich;
mod error;
pub mod filter;
pub mod message;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::{Config, DEFAULT_DEBOUNCE, DEFAULT_DEBOUNCE_MS};
pub use controller::{
    HttpSearchController, PageError, RequestSequence, SearchController, SearchResults,
    SearchState, SearchStatus,
};
pub use enrich::MetadataEnricher;
pub use error::{Error, Result};
pub use filter::{
    DEFAULT_PAGE_SIZE, FilterChange, FilterState, FilterUpdate, QueryBuilder, RequestDescriptor,
    SearchField, SortOrder,
};
pub use message::{EnrichedRecord, MessageRecord, Page, TrackMetadata};
pub use service::{
    EnrichError, HttpSearchService, HttpTrackService, SearchError, SearchResponse, SearchService,
    TrackService,
};
