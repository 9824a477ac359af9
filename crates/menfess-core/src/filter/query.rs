//! Canonical request descriptors built from filter state.

use std::fmt;

use url::form_urlencoded;

use super::model::FilterState;

/// Ordered query parameters for one search request.
///
/// Equal filters always yield equal descriptors with identical parameter
/// order, so descriptors can be compared to detect duplicate requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    params: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    /// Parameters in request order.
    #[must_use]
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Value of a parameter, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// URL-encoded query string, e.g. `recipient=Dinda&sort=desc&page=1&limit=10`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Translates filter state into request descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Builds the descriptor for `filter`.
    ///
    /// Order: search term (under the field name, only if non-blank), `date`
    /// (only if set), then `sort`, `page` and `limit`.
    #[must_use]
    pub fn build(filter: &FilterState) -> RequestDescriptor {
        let mut params = Vec::with_capacity(5);

        let term = filter.term.trim();
        if !term.is_empty() {
            params.push((filter.search_field.as_str(), term.to_string()));
        }
        if let Some(date) = filter.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        params.push(("sort", filter.sort_order.as_param().to_string()));
        params.push(("page", filter.page.to_string()));
        params.push(("limit", filter.page_size.to_string()));

        RequestDescriptor { params }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::filter::model::{SearchField, SortOrder};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::num::NonZeroU32;

    #[test]
    fn test_recipient_term() {
        let filter = FilterState {
            term: "Dinda".to_string(),
            ..FilterState::default()
        };
        assert_eq!(
            QueryBuilder::build(&filter).to_query_string(),
            "recipient=Dinda&sort=desc&page=1&limit=10"
        );
    }

    #[test]
    fn test_blank_term_omitted() {
        let filter = FilterState {
            term: "   ".to_string(),
            ..FilterState::default()
        };
        let descriptor = QueryBuilder::build(&filter);
        assert!(descriptor.get("recipient").is_none());
        assert_eq!(descriptor.to_query_string(), "sort=desc&page=1&limit=10");
    }

    #[test]
    fn test_all_parameters_in_order() {
        let filter = FilterState {
            search_field: SearchField::Sender,
            term: " budi santoso ".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 7),
            sort_order: SortOrder::Oldest,
            page: NonZeroU32::new(3).unwrap(),
            page_size: NonZeroU32::new(20).unwrap(),
        };
        let descriptor = QueryBuilder::build(&filter);
        let keys: Vec<_> = descriptor.params().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["sender", "date", "sort", "page", "limit"]);
        assert_eq!(descriptor.get("sender"), Some("budi santoso"));
        assert_eq!(
            descriptor.to_string(),
            "sender=budi+santoso&date=2024-03-07&sort=asc&page=3&limit=20"
        );
    }

    #[test]
    fn test_special_characters_encoded() {
        let filter = FilterState {
            term: "a&b=c".to_string(),
            ..FilterState::default()
        };
        assert_eq!(
            QueryBuilder::build(&filter).to_query_string(),
            "recipient=a%26b%3Dc&sort=desc&page=1&limit=10"
        );
    }

    fn filter_strategy() -> impl Strategy<Value = FilterState> {
        (
            prop_oneof![Just(SearchField::Sender), Just(SearchField::Recipient)],
            ".{0,12}",
            proptest::option::of((2000i32..2030, 1u32..=12, 1u32..=28)),
            prop_oneof![Just(SortOrder::Newest), Just(SortOrder::Oldest)],
            1u32..500,
            1u32..100,
        )
            .prop_map(|(search_field, term, date, sort_order, page, size)| FilterState {
                search_field,
                term,
                date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
                sort_order,
                page: NonZeroU32::new(page).unwrap(),
                page_size: NonZeroU32::new(size).unwrap(),
            })
    }

    proptest! {
        #[test]
        fn prop_equal_filters_build_identical_descriptors(filter in filter_strategy()) {
            let copy = filter.clone();
            let a = QueryBuilder::build(&filter);
            let b = QueryBuilder::build(&copy);
            prop_assert_eq!(a.to_query_string(), b.to_query_string());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_always_ends_with_sort_page_limit(filter in filter_strategy()) {
            let descriptor = QueryBuilder::build(&filter);
            let keys: Vec<_> = descriptor.params().iter().map(|(k, _)| *k).collect();
            prop_assert_eq!(&keys[keys.len() - 3..], &["sort", "page", "limit"]);
            let page = filter.page.to_string();
            prop_assert_eq!(descriptor.get("page"), Some(page.as_str()));
        }
    }
}
