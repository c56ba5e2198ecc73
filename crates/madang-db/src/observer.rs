//! # Statement Observer
//!
//! Hook called with the final SQL text and bound params right before a
//! repository executes a statement.
//!
//! ```text
//! repository ──► QueryRunner ──► observer.observe(kind, sql, params) ──► SQLite
//! ```
//!
//! [`TracingObserver`] is installed by default and logs at DEBUG, so
//! `RUST_LOG=madang_db=debug` shows every statement with its params.

use std::fmt;

use madang_core::SqlValue;
use tracing::debug;

/// Whether a statement reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Update,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Query => f.write_str("QUERY"),
            StatementKind::Update => f.write_str("UPDATE"),
        }
    }
}

/// Receives every statement before execution.
pub trait StatementObserver: Send + Sync + fmt::Debug {
    fn observe(&self, kind: StatementKind, sql: &str, params: &[SqlValue]);
}

/// Logs statements through `tracing` at DEBUG.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StatementObserver for TracingObserver {
    fn observe(&self, kind: StatementKind, sql: &str, params: &[SqlValue]) {
        debug!(kind = %kind, sql = %sql, params = ?params, "Executing statement");
    }
}

/// Ignores every statement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StatementObserver for NoopObserver {
    fn observe(&self, _kind: StatementKind, _sql: &str, _params: &[SqlValue]) {}
}
