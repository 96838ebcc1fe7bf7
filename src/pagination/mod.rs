//! Pagination module
//!
//! Offset (`skip`/`top`) pagination with guards for misbehaving endpoints.
//!
//! # Overview
//!
//! One [`Paginator`] enumerates one stream for one parent context. Each
//! request yields a page; the page is checked against the previous one
//! (repeated pages), de-duplicated by record identity, and the cursor
//! advanced until a short page, the reported total, or the iteration
//! ceiling ends the enumeration.

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::{
    PageRequest, PageSignature, StopReason, SyncCursor, DUPLICATE_PAGE_LIMIT, MAX_ITERATIONS,
    SKIP_PARAM, TOP_PARAM,
};

#[cfg(test)]
mod tests;
