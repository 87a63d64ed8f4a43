//! Offset pagination primitives shared by backend list endpoints.
//!
//! The crate is framework agnostic: inbound adapters parse query strings into
//! a [`PageRequest`], persistence adapters turn it into `LIMIT`/`OFFSET`
//! clauses, and responses are wrapped in a [`Paginated`] envelope carrying
//! [`PaginationMeta`] and optional navigation [`PaginationLinks`].
//!
//! # Examples
//!
//! ```
//! use pagination::{PageLimits, PageRequest, Paginated};
//!
//! let limits = PageLimits::new(&[10, 25, 50], 25);
//! let request = PageRequest::new(Some(2), Some(10), &limits).expect("valid page");
//! assert_eq!(request.offset(), 10);
//!
//! let page = Paginated::new(vec!["a", "b"], request, 12);
//! assert_eq!(page.pagination.total_pages, 2);
//! ```

mod envelope;
mod request;

pub use envelope::{Paginated, PaginationLinks, PaginationMeta};
pub use request::{PageLimits, PageRequest, PageRequestError};
