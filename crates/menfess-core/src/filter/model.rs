//! Filter state behind the search controls.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of records requested per page.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

/// Which side of a menfess the search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// Match the sender name.
    Sender,
    /// Match the recipient name.
    #[default]
    Recipient,
}

impl SearchField {
    /// Query parameter key for this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sender => "sender",
            Self::Recipient => "recipient",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sender" | "from" => Ok(Self::Sender),
            "recipient" | "to" => Ok(Self::Recipient),
            other => Err(format!("unknown search field: {other}")),
        }
    }
}

/// Result ordering by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recent first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
}

impl SortOrder {
    /// Value of the `sort` query parameter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Newest => "desc",
            Self::Oldest => "asc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        })
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "desc" | "latest" => Ok(Self::Newest),
            "oldest" | "asc" => Ok(Self::Oldest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Complete search filter.
///
/// `page` and `page_size` are non-zero by construction. Changing any field
/// through [`FilterState::apply`] other than `page` resets `page` to 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    /// Field the term is matched against.
    pub search_field: SearchField,
    /// Free-text search term.
    pub term: String,
    /// Only records created on this day.
    pub date: Option<NaiveDate>,
    /// Result ordering.
    pub sort_order: SortOrder,
    /// 1-based page number.
    pub page: NonZeroU32,
    /// Records per page.
    pub page_size: NonZeroU32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// What an update did to a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// Nothing differed.
    Unchanged,
    /// Only the page moved.
    Page,
    /// Field, term, date or sort changed; page is back at 1.
    Criteria,
}

impl FilterState {
    /// Creates an empty filter on page 1.
    #[must_use]
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            search_field: SearchField::default(),
            term: String::new(),
            date: None,
            sort_order: SortOrder::default(),
            page: NonZeroU32::MIN,
            page_size,
        }
    }

    /// Applies a partial update.
    pub fn apply(&mut self, update: FilterUpdate) -> FilterChange {
        let mut criteria_changed = false;

        if let Some(field) = update.search_field.filter(|f| *f != self.search_field) {
            self.search_field = field;
            criteria_changed = true;
        }
        if let Some(term) = update.term.filter(|t| *t != self.term) {
            self.term = term;
            criteria_changed = true;
        }
        if let Some(date) = update.date.filter(|d| *d != self.date) {
            self.date = date;
            criteria_changed = true;
        }
        if let Some(order) = update.sort_order.filter(|o| *o != self.sort_order) {
            self.sort_order = order;
            criteria_changed = true;
        }

        if criteria_changed {
            self.page = NonZeroU32::MIN;
            return FilterChange::Criteria;
        }

        match update.page.filter(|p| *p != self.page) {
            Some(page) => {
                self.page = page;
                FilterChange::Page
            }
            None => FilterChange::Unchanged,
        }
    }

    /// True if both filters select the same records, ignoring the page.
    #[must_use]
    pub fn same_criteria(&self, other: &Self) -> bool {
        self.search_field == other.search_field
            && self.term == other.term
            && self.date == other.date
            && self.sort_order == other.sort_order
            && self.page_size == other.page_size
    }
}

/// Partial filter change coming from the search controls.
///
/// `date` is doubly optional: `None` leaves the date alone, `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    /// New search field.
    pub search_field: Option<SearchField>,
    /// New search term.
    pub term: Option<String>,
    /// New date filter.
    pub date: Option<Option<NaiveDate>>,
    /// New sort order.
    pub sort_order: Option<SortOrder>,
    /// New page.
    pub page: Option<NonZeroU32>,
}

impl FilterUpdate {
    /// Update that only sets the term.
    #[must_use]
    pub fn term(term: impl Into<String>) -> Self {
        Self::default().with_term(term)
    }

    /// Sets the term.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Sets the search field.
    #[must_use]
    pub const fn with_search_field(mut self, field: SearchField) -> Self {
        self.search_field = Some(field);
        self
    }

    /// Sets or clears the date.
    #[must_use]
    pub const fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Sets the page.
    #[must_use]
    pub const fn with_page(mut self, page: NonZeroU32) -> Self {
        self.page = Some(page);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_default_filter() {
        let filter = FilterState::default();
        assert_eq!(filter.search_field, SearchField::Recipient);
        assert_eq!(filter.sort_order, SortOrder::Newest);
        assert_eq!(filter.page.get(), 1);
        assert_eq!(filter.page_size.get(), 10);
        assert!(filter.term.is_empty());
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let updates = [
            FilterUpdate::term("Dinda"),
            FilterUpdate::default().with_search_field(SearchField::Sender),
            FilterUpdate::default().with_date(NaiveDate::from_ymd_opt(2024, 5, 1)),
            FilterUpdate::default().with_sort_order(SortOrder::Oldest),
        ];

        for update in updates {
            let mut filter = FilterState {
                page: page(4),
                ..FilterState::default()
            };
            assert_eq!(filter.apply(update.clone()), FilterChange::Criteria, "{update:?}");
            assert_eq!(filter.page.get(), 1, "{update:?}");
        }
    }

    #[test]
    fn test_criteria_change_overrides_requested_page() {
        let mut filter = FilterState::default();
        let change = filter.apply(FilterUpdate::term("a").with_page(page(3)));
        assert_eq!(change, FilterChange::Criteria);
        assert_eq!(filter.page.get(), 1);
    }

    #[test]
    fn test_page_only_change() {
        let mut filter = FilterState::default();
        assert_eq!(
            filter.apply(FilterUpdate::default().with_page(page(2))),
            FilterChange::Page
        );
        assert_eq!(filter.page.get(), 2);
    }

    #[test]
    fn test_same_values_are_unchanged() {
        let mut filter = FilterState {
            term: "x".to_string(),
            page: page(2),
            ..FilterState::default()
        };
        let update = FilterUpdate::term("x")
            .with_sort_order(SortOrder::Newest)
            .with_page(page(2));
        assert_eq!(filter.apply(update), FilterChange::Unchanged);
        assert_eq!(filter.page.get(), 2);
    }

    #[test]
    fn test_clearing_date() {
        let mut filter = FilterState {
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..FilterState::default()
        };
        assert_eq!(
            filter.apply(FilterUpdate::default().with_date(None)),
            FilterChange::Criteria
        );
        assert!(filter.date.is_none());
    }

    #[test]
    fn test_same_criteria_ignores_page() {
        let a = FilterState::default();
        let b = FilterState {
            page: page(5),
            ..FilterState::default()
        };
        assert!(a.same_criteria(&b));
        let c = FilterState {
            term: "x".to_string(),
            ..FilterState::default()
        };
        assert!(!a.same_criteria(&c));
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Sender".parse::<SearchField>().unwrap(), SearchField::Sender);
        assert_eq!("to".parse::<SearchField>().unwrap(), SearchField::Recipient);
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
