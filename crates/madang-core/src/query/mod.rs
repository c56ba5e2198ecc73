//! # Query Engine
//!
//! Builds safe, parameter-bound listing SQL and the pagination metadata that
//! accompanies it.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Listing Request                                 │
//! │                                                                         │
//! │  raw filters ──► Predicate ──────────┐                                 │
//! │                  "WHERE a AND b"     │                                 │
//! │                  [v1, v2]            │                                 │
//! │                                      ▼                                 │
//! │  sortBy/direction ──► SortSpec ──► SelectQuery ──► count SQL + params  │
//! │                       (whitelist)    │          └─► data SQL + params  │
//! │                                      │               (+ LIMIT, OFFSET) │
//! │  page/pageSize ──► PageSpec ─────────┘                                 │
//! │                     (clamped)                                           │
//! │                                                                         │
//! │  executed rows + total ──► PageEnvelope { items, totalPages, ... }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only whitelisted column expressions and fixed fragments are ever
//! concatenated into SQL text. Every caller-supplied value travels as a
//! bound [`SqlValue`].

pub mod page;
pub mod predicate;
pub mod select;
pub mod sort;

pub use page::{clamp_limit, total_pages, Listing, PageEnvelope, PageSpec};
pub use predicate::{Predicate, SqlValue};
pub use select::{build_count_query, build_data_query, SelectQuery, Window};
pub use sort::{resolve_sort, DirectionPolicy, SortDirection, SortSpec, SortWhitelist};
