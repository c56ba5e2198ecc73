//! # Repository Module
//!
//! One repository per entity plus one for store-wide reports.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │  db.books().list(&filter, sort_by, direction, window)          │
//! │       ▼                                                                 │
//! │  BookRepository                                                        │
//! │  ├── listing config (madang-core) → SelectQuery                        │
//! │  └── QueryRunner → observer → SQLite                                   │
//! │                                                                         │
//! │  Listing reads go through the shared engine; point lookups and        │
//! │  writes use fixed SQL with `?` placeholders.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BookRepository`] - Catalog CRUD, search, publishers, per-book sales
//! - [`CustomerRepository`] - Customer CRUD, search, login lookup
//! - [`OrderRepository`] - Order history, placement, price updates
//! - [`StatsRepository`] - Dashboard and sales reports

pub mod book;
pub mod customer;
pub mod order;
pub mod stats;

pub use book::BookRepository;
pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use stats::StatsRepository;
