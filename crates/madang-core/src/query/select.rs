//! # SQL Assembly
//!
//! Combines a table expression, a [`Predicate`] and a [`SortSpec`] into the
//! count statement and the data statement of a listing.
//!
//! ## Statement Shapes
//! ```text
//! count:  SELECT COUNT(*) AS total FROM <from> <where>
//! data:   SELECT <columns> FROM <from> <where> [GROUP BY ..] ORDER BY <col> <dir> <window>
//!
//! window: Window::All        → (nothing)
//!         Window::Limit(n)   → LIMIT ?            params += [n]
//!         Window::Page(spec) → LIMIT ? OFFSET ?   params += [size, offset]
//! ```
//! Window params are always appended after the predicate params, so both
//! statements share an identical parameter prefix.

use crate::query::page::PageSpec;
use crate::query::predicate::{Predicate, SqlValue};
use crate::query::sort::SortSpec;

/// Which slice of the ordered result the data statement returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Every matching row (non-paginated mode).
    All,
    /// The first `n` rows.
    Limit(u32),
    /// One offset page.
    Page(PageSpec),
}

/// Renders `SELECT COUNT(*) AS total FROM <table> <where>`.
pub fn build_count_query(table: &str, where_clause: &str) -> String {
    join_words(&["SELECT COUNT(*) AS total FROM", table, where_clause])
}

/// Renders the data statement for a listing.
///
/// A page window appends `LIMIT ? OFFSET ?`; the caller binds the page size
/// then the offset after the predicate params.
pub fn build_data_query(
    table: &str,
    columns: &str,
    where_clause: &str,
    sort: &SortSpec,
    page: Option<&PageSpec>,
) -> String {
    let window = match page {
        Some(spec) => Window::Page(*spec),
        None => Window::All,
    };
    render_data(table, columns, where_clause, None, sort, &window)
}

fn render_data(
    table: &str,
    columns: &str,
    where_clause: &str,
    group_by: Option<&str>,
    sort: &SortSpec,
    window: &Window,
) -> String {
    let select = format!("SELECT {} FROM", columns);
    let group = group_by.map(|keys| format!("GROUP BY {}", keys));
    let order = sort.order_by();
    let tail = match window {
        Window::All => "",
        Window::Limit(_) => "LIMIT ?",
        Window::Page(_) => "LIMIT ? OFFSET ?",
    };
    join_words(&[
        select.as_str(),
        table,
        where_clause,
        group.as_deref().unwrap_or_default(),
        order.as_str(),
        tail,
    ])
}

/// Joins non-empty parts with single spaces.
fn join_words(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A fully resolved listing statement pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    from: &'static str,
    columns: &'static str,
    group_by: Option<&'static str>,
    predicate: Predicate,
    sort: SortSpec,
}

impl SelectQuery {
    /// Creates a query over `from` projecting `columns`.
    pub fn new(
        from: &'static str,
        columns: &'static str,
        predicate: Predicate,
        sort: SortSpec,
    ) -> Self {
        SelectQuery {
            from,
            columns,
            group_by: None,
            predicate,
            sort,
        }
    }

    /// Groups rows (for aggregate reports).
    pub fn group_by(mut self, keys: &'static str) -> Self {
        self.group_by = Some(keys);
        self
    }

    /// The resolved sort.
    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// The predicate shared by both statements.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Count statement. Grouped queries count their groups.
    pub fn count_sql(&self) -> String {
        let where_clause = self.predicate.clause();
        match self.group_by {
            None => build_count_query(self.from, where_clause.as_str()),
            Some(keys) => {
                let group = format!("GROUP BY {}", keys);
                let inner = join_words(&[
                    "SELECT 1 FROM",
                    self.from,
                    where_clause.as_str(),
                    group.as_str(),
                ]);
                format!("SELECT COUNT(*) AS total FROM ({}) AS grouped", inner)
            }
        }
    }

    /// Params for [`SelectQuery::count_sql`].
    pub fn count_params(&self) -> Vec<SqlValue> {
        self.predicate.params()
    }

    /// Data statement for the given window.
    pub fn data_sql(&self, window: &Window) -> String {
        render_data(
            self.from,
            self.columns,
            &self.predicate.clause(),
            self.group_by,
            &self.sort,
            window,
        )
    }

    /// Params for [`SelectQuery::data_sql`]: predicate params, then window params.
    pub fn data_params(&self, window: &Window) -> Vec<SqlValue> {
        let mut params = self.predicate.params();
        match window {
            Window::All => {}
            Window::Limit(n) => params.push(SqlValue::from(*n)),
            Window::Page(spec) => {
                params.push(SqlValue::from(spec.page_size()));
                params.push(SqlValue::Int(spec.offset() as i64));
            }
        }
        params
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
