//! # Predicate Builder
//!
//! Turns optional filter inputs into a `WHERE` clause plus the values bound
//! to its placeholders.
//!
//! ## Alignment Rule
//! ```text
//! conditions:  [ "bookname LIKE ?" , "price >= ?" ]
//!                        │                  │
//! params:      [      "%java%"     ,      10000     ]
//!
//! clause:      "WHERE bookname LIKE ? AND price >= ?"
//! ```
//! Each condition owns exactly one placeholder and exactly one value, so the
//! Nth `?` always binds the Nth param. Conditions are emitted in the order
//! the builder methods were called.

use std::fmt;

use serde::Serialize;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    /// SQL `NULL` (optional columns on writes; never produced by a predicate).
    Null,
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "'{}'", v),
            SqlValue::Null => f.write_str("NULL"),
        }
    }
}

/// One `fragment ? ` / value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Condition {
    fragment: &'static str,
    value: SqlValue,
}

/// An ordered set of SQL conditions and their bound values.
///
/// Building never fails: blank text and absent numbers simply add nothing.
///
/// ## Example
/// ```rust
/// use madang_core::query::{Predicate, SqlValue};
///
/// let predicate = Predicate::new()
///     .contains("bookname LIKE ?", Some("java"))
///     .contains("publisher LIKE ?", Some("   "))
///     .at_bound("price >= ?", Some(10000))
///     .at_bound("price <= ?", None);
///
/// assert_eq!(predicate.clause(), "WHERE bookname LIKE ? AND price >= ?");
/// assert_eq!(
///     predicate.params(),
///     vec![SqlValue::Text("%java%".into()), SqlValue::Int(10000)]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Creates an empty predicate (no `WHERE` at all).
    pub fn new() -> Self {
        Predicate::default()
    }

    /// Adds a substring match when `input` holds non-whitespace text.
    ///
    /// The input is trimmed, then wrapped in `%` wildcards. The wildcards go
    /// into the bound value, never into the SQL text.
    pub fn contains(self, fragment: &'static str, input: Option<&str>) -> Self {
        match input {
            Some(text) if !text.trim().is_empty() => {
                self.push(fragment, SqlValue::Text(format!("%{}%", text.trim())))
            }
            _ => self,
        }
    }

    /// Adds an exact text match when `input` holds non-whitespace text.
    pub fn equals(self, fragment: &'static str, input: Option<&str>) -> Self {
        match input {
            Some(text) if !text.trim().is_empty() => {
                self.push(fragment, SqlValue::Text(text.trim().to_string()))
            }
            _ => self,
        }
    }

    /// Adds a numeric comparison (`>=`, `<=`, ...) when `input` is present.
    pub fn at_bound(self, fragment: &'static str, input: Option<i64>) -> Self {
        match input {
            Some(value) => self.push(fragment, SqlValue::Int(value)),
            None => self,
        }
    }

    /// Adds a condition unconditionally (e.g. `o.custid = ?`).
    pub fn require(self, fragment: &'static str, value: impl Into<SqlValue>) -> Self {
        self.push(fragment, value.into())
    }

    fn push(mut self, fragment: &'static str, value: SqlValue) -> Self {
        debug_assert_eq!(
            fragment.matches('?').count(),
            1,
            "condition fragment must hold exactly one placeholder: {fragment}"
        );
        self.conditions.push(Condition { fragment, value });
        self
    }

    /// Returns true when no condition was included.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of included conditions (and therefore of bound params).
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Renders the clause: `""`, or `"WHERE a"`, or `"WHERE a AND b ..."`.
    pub fn clause(&self) -> String {
        let mut clause = String::new();
        for (i, condition) in self.conditions.iter().enumerate() {
            clause.push_str(if i == 0 { "WHERE " } else { " AND " });
            clause.push_str(condition.fragment);
        }
        clause
    }

    /// Returns the bound values in placeholder order.
    pub fn params(&self) -> Vec<SqlValue> {
        self.conditions.iter().map(|c| c.value.clone()).collect()
    }

    /// Returns the clause and its params together.
    pub fn build(&self) -> (String, Vec<SqlValue>) {
        (self.clause(), self.params())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
