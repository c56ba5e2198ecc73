//! # Offset Pagination
//!
//! Page request clamping and the page envelope returned to callers.
//!
//! ## Arithmetic
//! ```text
//! PageSpec::new(page, size)    page  = max(page, 1)
//!                              size  = clamp(size, 1, 100)
//!                              offset = (page - 1) * size
//!
//! PageEnvelope                 totalPages  = ceil(totalItems / size)   (0 if size <= 0)
//!                              hasNext     = page < totalPages
//!                              hasPrevious = page > 1
//! ```
//!
//! Example: 101 items, 20 per page → 6 pages; page 6 has no next page.

use serde::Serialize;

use crate::{MAX_PAGE_SIZE, MAX_REPORT_LIMIT};

// =============================================================================
// Page Spec
// =============================================================================

/// A clamped page request.
///
/// Invalid input is corrected on construction, never rejected.
///
/// ## Example
/// ```rust
/// use madang_core::query::PageSpec;
///
/// let spec = PageSpec::new(0, 500);
/// assert_eq!(spec.page(), 1);
/// assert_eq!(spec.page_size(), 100);
/// assert_eq!(spec.offset(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page: u32,
    page_size: u32,
}

impl PageSpec {
    /// Creates a page request, clamping page to ≥ 1 and size to [1, 100].
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = page.clamp(1, i64::from(u32::MAX)) as u32;
        let page_size = page_size.clamp(1, i64::from(MAX_PAGE_SIZE)) as u32;
        PageSpec { page, page_size }
    }

    /// 1-based page number.
    #[inline]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[inline]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip before this page.
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec::new(1, i64::from(crate::DEFAULT_PAGE_SIZE))
    }
}

/// Clamps a "top N" row cap to [1, 100].
pub fn clamp_limit(limit: i64) -> u32 {
    limit.clamp(1, i64::from(MAX_REPORT_LIMIT)) as u32
}

/// `ceil(total_items / page_size)`, or 0 when `page_size <= 0`.
pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total_items <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

// =============================================================================
// Page Envelope
// =============================================================================

/// One page of results plus the metadata a client needs to navigate.
///
/// ## Serialization
/// ```json
/// {
///   "items": [...],
///   "page": 2,
///   "pageSize": 10,
///   "totalItems": 25,
///   "totalPages": 3,
///   "hasNext": true,
///   "hasPrevious": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageEnvelope<T> {
    /// Assembles an envelope from a clamped spec and an executed count.
    ///
    /// `items` and `total_items` must come from queries that shared the same
    /// predicate and params.
    pub fn assemble(items: Vec<T>, spec: &PageSpec, total_items: i64) -> Self {
        PageEnvelope::from_parts(
            items,
            i64::from(spec.page()),
            i64::from(spec.page_size()),
            total_items,
        )
    }

    /// Assembles an envelope from raw numbers.
    ///
    /// A non-positive page size yields zero pages and no navigation in
    /// either direction.
    pub fn from_parts(items: Vec<T>, page: i64, page_size: i64, total_items: i64) -> Self {
        let total_pages = total_pages(total_items, page_size);
        let navigable = page_size > 0;
        PageEnvelope {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: navigable && page < total_pages,
            has_previous: navigable && page > 1,
        }
    }

    /// Converts the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageEnvelope<U> {
        PageEnvelope {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Result of a listing call: an envelope when pagination was requested,
/// otherwise the flat sequence.
///
/// Serializes untagged, so clients see either the envelope object or a
/// plain JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(PageEnvelope<T>),
    All(Vec<T>),
}

impl<T> Listing<T> {
    /// Items in this listing, regardless of shape.
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Page(envelope) => &envelope.items,
            Listing::All(items) => items,
        }
    }

    /// Converts the items while keeping the shape.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Listing::Page(envelope) => Listing::Page(envelope.map(f)),
            Listing::All(items) => Listing::All(items.into_iter().map(f).collect()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
