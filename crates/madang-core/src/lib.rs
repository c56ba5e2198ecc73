//! # madang-core: Query Engine and Domain Types for the Madang Bookstore
//!
//! Everything in this crate is a pure function of its inputs. It decides
//! *what* SQL text may reach the database and *how* results are sliced into
//! pages, but never executes anything itself.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Madang Bookstore Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/server (axum handlers)                     │   │
//! │  │   ?title=java&priceMin=10000&sortBy=price&page=2&pageSize=10    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ BookFilter, SortRequest, PageSpec      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ madang-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ predicate │  │   sort    │  │   page    │  │  listing  │  │   │
//! │  │   │ WHERE ..  │  │ whitelist │  │ PageSpec  │  │ per-entity│  │   │
//! │  │   │ + params  │  │ ASC/DESC  │  │ Envelope  │  │  configs  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SelectQuery (count SQL, data SQL)     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   madang-db (Database Layer)                    │   │
//! │  │          binds params, runs count + page in one transaction     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`query`] - Predicate builder, sort resolution, page arithmetic, SQL assembly
//! - [`listing`] - Per-entity table expressions, filters and sort whitelists
//! - [`types`] - Books, customers, orders and report rows
//! - [`access`] - Roles and capability checks
//! - [`validation`] - Input validation for writes
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use madang_core::listing::{BookFilter, BOOKS};
//! use madang_core::query::{PageSpec, SqlValue, Window};
//!
//! let filter = BookFilter {
//!     title: Some("java".to_string()),
//!     min_price: Some(10000),
//!     ..Default::default()
//! };
//!
//! let query = BOOKS.query(&filter, Some("price"), Some("desc"));
//! let window = Window::Page(PageSpec::new(2, 10));
//!
//! assert_eq!(
//!     query.data_sql(&window),
//!     "SELECT bookid, bookname, publisher, price FROM Book \
//!      WHERE bookname LIKE ? AND price >= ? ORDER BY price DESC LIMIT ? OFFSET ?"
//! );
//! assert_eq!(
//!     query.data_params(&window),
//!     vec![
//!         SqlValue::Text("%java%".into()),
//!         SqlValue::Int(10000),
//!         SqlValue::Int(10),
//!         SqlValue::Int(10),
//!     ]
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod listing;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Principal, Role};
pub use error::{AccessError, CoreError, CoreResult, ValidationError};
pub use query::{
    DirectionPolicy, Listing, PageEnvelope, PageSpec, Predicate, SelectQuery, SortDirection,
    SortSpec, SortWhitelist, SqlValue, Window,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest page a caller may request.
///
/// ## Business Reason
/// Keeps a single listing request bounded no matter what `pageSize` the
/// browser sends. Larger requests are clamped, never rejected.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used for book listings when only `page` is supplied.
pub const DEFAULT_BOOK_PAGE_SIZE: u32 = 20;

/// Page size used for customer and order listings when only `page` is supplied.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest row cap accepted by "top N" reports (bestsellers, recent orders).
pub const MAX_REPORT_LIMIT: u32 = 100;
