//! Message records as received from the search service.

pub mod model;

pub use model::{EnrichedRecord, MessageRecord, Page, TrackMetadata};
