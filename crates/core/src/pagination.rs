//! Page requests and pages for the product listing.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_LIMIT: u32 = 12;

/// Largest page the storefront will ask for.
pub const MAX_LIMIT: u32 = 100;

/// Query for one page of a listing.
///
/// Deserializes from the `page`, `limit`, `search` and `category` query
/// parameters; out-of-range values are normalized rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    limit: u32,
    search: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: Option<u32>,
    limit: Option<u32>,
    search: Option<String>,
    category: Option<String>,
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        Self::new(raw.page.unwrap_or(1), raw.limit.unwrap_or(DEFAULT_LIMIT))
            .with_search(raw.search.as_deref())
            .with_category(raw.category.as_deref())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

impl PageRequest {
    /// A request for `page` (at least 1) of `limit` items (clamped to
    /// `1..=MAX_LIMIT`).
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
            search: None,
            category: None,
        }
    }

    /// Set the search term. Blank terms clear it.
    #[must_use]
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        self
    }

    /// Set the category filter. `all` and blank clear it.
    #[must_use]
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_owned);
        self
    }

    /// The same query, for another page.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Whether this is the first page of an unfiltered listing.
    #[must_use]
    pub const fn is_unfiltered_first_page(&self) -> bool {
        self.page == 1 && self.search.is_none() && self.category.is_none()
    }

    /// Query parameters in wire order, omitting unset filters.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages, when the source reports it.
    pub total: Option<u64>,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: Option<u64>, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Whether another page should be requested.
    ///
    /// With a known total, items seen so far must fall short of it. Without
    /// one, a full page suggests more follow.
    #[must_use]
    pub fn has_more(&self) -> bool {
        let len = self.items.len() as u64;
        match self.total {
            Some(total) => {
                let seen = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit) + len;
                len > 0 && seen < total
            }
            None => len == u64::from(self.limit),
        }
    }

    /// Number of the following page, when there is one.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.has_more().then(|| self.page.saturating_add(1))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform the items, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page_of(len: usize, total: Option<u64>, page: u32) -> Page<usize> {
        Page::new((0..len).collect(), total, &PageRequest::new(page, 12))
    }

    #[test]
    fn test_request_normalization() {
        let req = PageRequest::new(0, 1000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), MAX_LIMIT);
        assert_eq!(PageRequest::new(3, 0).limit(), 1);
    }

    #[test]
    fn test_request_filters() {
        let req = PageRequest::default()
            .with_search(Some("  drill  "))
            .with_category(Some("All"));
        assert_eq!(req.search(), Some("drill"));
        assert!(req.category().is_none());

        let req = req.with_search(Some("   ")).with_category(Some("tools"));
        assert!(req.search().is_none());
        assert_eq!(req.category(), Some("tools"));
    }

    #[test]
    fn test_request_from_query() {
        let req: PageRequest =
            serde_json::from_str(r#"{"page":2,"search":" tent ","category":"all"}"#).unwrap();
        assert_eq!(req.page(), 2);
        assert_eq!(req.limit(), DEFAULT_LIMIT);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("page", "2".to_string()),
                ("limit", "12".to_string()),
                ("search", "tent".to_string()),
            ]
        );
    }

    #[test]
    fn test_has_more_known_total() {
        assert!(page_of(12, Some(30), 1).has_more());
        assert!(page_of(12, Some(30), 2).has_more());
        assert!(!page_of(6, Some(30), 3).has_more());
        assert!(!page_of(12, Some(24), 2).has_more());
        assert!(!page_of(0, Some(30), 4).has_more());
    }

    #[test]
    fn test_has_more_unknown_total() {
        assert!(page_of(12, None, 1).has_more());
        assert!(!page_of(11, None, 1).has_more());
        assert!(!page_of(0, None, 1).has_more());
    }

    #[test]
    fn test_next_page() {
        assert_eq!(page_of(12, Some(30), 1).next_page(), Some(2));
        assert_eq!(page_of(6, Some(30), 3).next_page(), None);
    }

    #[test]
    fn test_unfiltered_first_page() {
        assert!(PageRequest::default().is_unfiltered_first_page());
        assert!(!PageRequest::default().with_page(2).is_unfiltered_first_page());
        assert!(
            !PageRequest::default()
                .with_search(Some("bike"))
                .is_unfiltered_first_page()
        );
    }
}
