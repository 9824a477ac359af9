//! Remote services consumed by the search pipeline.
//!
//! Each service sits behind a trait so the controller and enricher can be
//! driven by in-memory fakes in tests and by the HTTP clients in production.

pub mod search;
pub mod track;

pub use search::{HttpSearchService, SearchError, SearchResponse, SearchService};
pub use track::{EnrichError, HttpTrackService, TrackService};
