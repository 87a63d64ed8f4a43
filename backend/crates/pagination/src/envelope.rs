//! Response envelope for paginated listings.

use serde::Serialize;
use url::Url;

use crate::PageRequest;

/// Page position and totals reported alongside listing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total matching rows across all pages.
    pub total: u64,
    /// Number of pages needed to show `total` rows; zero when empty.
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Compute totals for `request` over `total` matching rows.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit());
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }

    /// Whether a page exists after this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    /// Whether a page exists before this one.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Navigation links relative to the URL that produced the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub self_: String,
    /// Link to the next page when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the previous page when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PaginationLinks {
    /// Derive links from the request URL, replacing its `page` and `limit`
    /// query parameters and keeping every other parameter in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::{PageLimits, PageRequest, PaginationLinks, PaginationMeta};
    /// use url::Url;
    ///
    /// let limits = PageLimits::new(&[10], 10);
    /// let request = PageRequest::new(Some(1), Some(10), &limits).expect("valid");
    /// let meta = PaginationMeta::new(request, 25);
    /// let base = Url::parse("http://localhost/tasks?status=open&page=1").expect("url");
    ///
    /// let links = PaginationLinks::from_url(&base, &meta);
    /// assert_eq!(
    ///     links.next.as_deref(),
    ///     Some("http://localhost/tasks?status=open&page=2&limit=10")
    /// );
    /// assert!(links.prev.is_none());
    /// ```
    #[must_use]
    pub fn from_url(base: &Url, meta: &PaginationMeta) -> Self {
        let next = meta
            .has_next()
            .then(|| page_url(base, meta.page.saturating_add(1), meta.limit));
        let prev = meta
            .has_prev()
            .then(|| page_url(base, meta.page.saturating_sub(1), meta.limit));
        Self {
            self_: page_url(base, meta.page, meta.limit),
            next,
            prev,
        }
    }
}

fn page_url(base: &Url, page: u32, limit: u32) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page" && key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string())
        .append_pair("limit", &limit.to_string());
    url.to_string()
}

/// Listing envelope: one page of `data` plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Page position and totals.
    pub pagination: PaginationMeta,
    /// Optional navigation links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginationLinks>,
}

impl<T> Paginated<T> {
    /// Wrap a page of items without navigation links.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(request, total),
            links: None,
        }
    }

    /// Attach navigation links derived from `base`.
    #[must_use]
    pub fn with_links(mut self, base: &Url) -> Self {
        self.links = Some(PaginationLinks::from_url(base, &self.pagination));
        self
    }

    /// Convert every item while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
            links: self.links,
        }
    }
}
