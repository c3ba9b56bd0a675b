//! Page/size normalization shared by the listing endpoints.
//!
//! Out-of-range input is clamped, never rejected.

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// `page < 1` becomes 1; a size outside `1..=200` becomes the default.
    pub fn clamped(page: i64, page_size: i64) -> Self {
        let page = if page < 1 { DEFAULT_PAGE } else { page };
        let page_size = if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self { page, page_size }
    }

    /// Lenient parse of raw query values. Unparsable input counts as 0.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = page.map_or(DEFAULT_PAGE, parse_or_zero);
        let page_size = page_size.map_or(DEFAULT_PAGE_SIZE, parse_or_zero);
        Self::clamped(page, page_size)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

fn parse_or_zero(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page() {
        assert_eq!(PageRequest::clamped(0, 20).page(), 1);
        assert_eq!(PageRequest::clamped(-5, 20).page(), 1);
        assert_eq!(PageRequest::clamped(3, 20).page(), 3);
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(PageRequest::clamped(1, 0).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::clamped(1, -1).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::clamped(1, 201).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::clamped(1, 200).page_size(), 200);
        assert_eq!(PageRequest::clamped(1, 1).page_size(), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::clamped(1, 20).offset(), 0);
        assert_eq!(PageRequest::clamped(3, 50).offset(), 100);
        assert!(PageRequest::clamped(i64::MAX, 200).offset() > 0);
    }

    #[test]
    fn test_from_query_defaults_and_garbage() {
        let req = PageRequest::from_query(None, None);
        assert_eq!((req.page(), req.page_size()), (1, 20));

        let req = PageRequest::from_query(Some("abc"), Some("x"));
        assert_eq!((req.page(), req.page_size()), (1, 20));

        let req = PageRequest::from_query(Some("2"), Some("5"));
        assert_eq!((req.page(), req.page_size()), (2, 5));
    }
}
