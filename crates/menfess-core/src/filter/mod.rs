//! Search filter state and request building.

pub mod model;
pub mod query;

pub use model::{DEFAULT_PAGE_SIZE, FilterChange, FilterState, FilterUpdate, SearchField, SortOrder};
pub use query::{QueryBuilder, RequestDescriptor};
