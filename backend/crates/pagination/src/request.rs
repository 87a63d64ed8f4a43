//! Validated page requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a page request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers start at one.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// The requested limit is not one of the allowed page sizes.
    #[error("limit must be one of {allowed:?}, got {limit}")]
    LimitNotAllowed {
        /// Rejected limit.
        limit: u32,
        /// Page sizes the endpoint accepts.
        allowed: &'static [u32],
    },
}

/// Page sizes an endpoint accepts plus the size used when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    allowed: &'static [u32],
    default_limit: u32,
}

impl PageLimits {
    /// Build a limit policy.
    ///
    /// `default_limit` should be a member of `allowed`; it is used verbatim
    /// when the client omits the limit.
    #[must_use]
    pub const fn new(allowed: &'static [u32], default_limit: u32) -> Self {
        Self {
            allowed,
            default_limit,
        }
    }

    /// Accepted page sizes.
    #[must_use]
    pub const fn allowed(&self) -> &'static [u32] {
        self.allowed
    }

    /// Page size applied when the request omits one.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }
}

/// One-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate optional page and limit values against `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::PageOutOfRange`] for page zero and
    /// [`PageRequestError::LimitNotAllowed`] for limits outside the policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::{PageLimits, PageRequest, PageRequestError};
    ///
    /// let limits = PageLimits::new(&[10, 25, 50], 25);
    /// let defaults = PageRequest::new(None, None, &limits).expect("defaults are valid");
    /// assert_eq!((defaults.page(), defaults.limit()), (1, 25));
    ///
    /// let err = PageRequest::new(Some(1), Some(7), &limits).expect_err("7 is not allowed");
    /// assert!(matches!(err, PageRequestError::LimitNotAllowed { limit: 7, .. }));
    /// ```
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        limits: &PageLimits,
    ) -> Result<Self, PageRequestError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        let limit = limit.unwrap_or(limits.default_limit);
        if !limits.allowed.contains(&limit) {
            return Err(PageRequestError::LimitNotAllowed {
                limit,
                allowed: limits.allowed,
            });
        }
        Ok(Self { page, limit })
    }

    /// First page at the policy's default size.
    #[must_use]
    pub const fn first(limits: &PageLimits) -> Self {
        Self {
            page: 1,
            limit: limits.default_limit,
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}
