//! Pagination, search and ordering rules shared by every list query.

use serde::{Deserialize, Serialize};

/// The only page sizes a caller may request.
pub const ALLOWED_PAGE_SIZES: [u64; 4] = [10, 20, 50, 100];

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw list-query arguments as they arrive from the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub order_by: Option<String>,
}

impl PageParams {
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Saturates instead of overflowing; `page` comes straight from the
    /// query string.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }

    /// Trimmed search term, if one was supplied and non-empty.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Validates the page size against the allow-list.
pub fn validate_page_size(page_size: u64) -> Result<(), String> {
    if ALLOWED_PAGE_SIZES.contains(&page_size) {
        Ok(())
    } else {
        Err(format!(
            "Invalid page_size. Valid values are 10, 20, 50, 100. Got {page_size}."
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Parses an `order_by` argument (`field` or `-field`) against an allow-list
/// of sortable fields for the entity.
pub fn parse_order_by<'a>(
    order_by: &'a str,
    allowed: &[&str],
) -> Result<(&'a str, SortOrder), String> {
    let (field, order) = order_by
        .strip_prefix('-')
        .map_or((order_by, SortOrder::Asc), |f| (f, SortOrder::Desc));

    if allowed.contains(&field) {
        Ok((field, order))
    } else {
        Err(format!("Invalid order_by value: {order_by}"))
    }
}

/// Response envelope for every paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Builds the envelope from an already-sliced result set and the
    /// pre-slice total.
    #[must_use]
    pub fn new(results: Vec<T>, total_count: u64, page: u64, page_size: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        Self {
            results,
            total_count,
            page,
            page_size,
            has_next: offset.saturating_add(page_size) < total_count,
            has_previous: offset > 0,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_allow_list() {
        for size in ALLOWED_PAGE_SIZES {
            assert!(validate_page_size(size).is_ok());
        }
        for size in [0, 1, 5, 15, 25, 99, 105, 1000] {
            assert!(validate_page_size(size).is_err());
        }
    }

    #[test]
    fn test_order_by_parsing() {
        let allowed = ["barcode", "created_at"];
        assert_eq!(
            parse_order_by("barcode", &allowed),
            Ok(("barcode", SortOrder::Asc))
        );
        assert_eq!(
            parse_order_by("-created_at", &allowed),
            Ok(("created_at", SortOrder::Desc))
        );
        assert!(parse_order_by("invalid_field", &allowed).is_err());
        assert!(parse_order_by("-invalid_field", &allowed).is_err());
    }

    // total_count=25, page_size=10: pages 1,2,3 yield 10,10,5 results and
    // (has_next, has_previous) = (T,F), (T,T), (F,T).
    #[test]
    fn test_boundary_pages() {
        let page1 = Page::new(vec![0; 10], 25, 1, 10);
        assert!(page1.has_next);
        assert!(!page1.has_previous);

        let page2 = Page::new(vec![0; 10], 25, 2, 10);
        assert!(page2.has_next);
        assert!(page2.has_previous);

        let page3 = Page::new(vec![0; 5], 25, 3, 10);
        assert!(!page3.has_next);
        assert!(page3.has_previous);
    }

    #[test]
    fn test_single_page_has_no_neighbours() {
        let page = Page::new(vec![0; 5], 5, 1, 10);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let params = PageParams {
            page: Some(u64::MAX),
            page_size: Some(100),
            ..Default::default()
        };
        assert_eq!(params.offset(), u64::MAX);

        let page = Page::new(Vec::<i32>::new(), 25, u64::MAX, 100);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn test_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
        assert_eq!(params.offset(), 0);
        assert!(params.search_term().is_none());
    }

    #[test]
    fn test_blank_search_ignored() {
        let params = PageParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(params.search_term().is_none());
    }
}
