//! # madang-db: Database Layer for the Madang Bookstore
//!
//! SQLite storage for books, customers and orders, plus the execution side
//! of the listing engine defined in `madang-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Madang Request Data Flow                           │
//! │                                                                         │
//! │  axum handler (GET /api/books?title=..&page=2)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     madang-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  book         │    │  (embedded)  │  │   │
//! │  │   │               │    │  customer     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  order        │    │ 001_init.sql │  │   │
//! │  │   │ Observer      │    │  stats        │    │ 002_idx.sql  │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        QueryRunner (engine.rs)                  │   │
//! │  │                        bind params, observe, count + page       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`engine`] - Parameter binding, listing execution
//! - [`observer`] - Statement observer hook (tracing by default)
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Book, customer, order and statistics repositories
//! - [`sample`] - The classic sample data set
//!
//! ## Usage
//!
//! ```rust,ignore
//! use madang_db::{Database, DbConfig};
//! use madang_core::{listing::BookFilter, query::Window};
//!
//! let db = Database::new(DbConfig::new("./data/madang.db")).await?;
//!
//! let filter = BookFilter { title: Some("축구".into()), ..Default::default() };
//! let books = db.books().list(&filter, Some("price"), None, Window::All).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod observer;
pub mod pool;
pub mod repository;
pub mod sample;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::QueryRunner;
pub use error::{DbError, DbResult};
pub use observer::{NoopObserver, StatementKind, StatementObserver, TracingObserver};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{BookRepository, CustomerRepository, OrderRepository, StatsRepository};
