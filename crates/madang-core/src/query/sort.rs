//! # Sort Resolution
//!
//! Maps an untrusted `sortBy` / `direction` pair onto a trusted column
//! expression and an `ASC`/`DESC` token.
//!
//! ## Direction Policies
//! ```text
//! ┌───────────────────────┬──────────────────────┬──────────────────────┐
//! │ input                 │ Listing (books, ...) │ Report (stats, ...)  │
//! ├───────────────────────┼──────────────────────┼──────────────────────┤
//! │ "desc" / "DESC"       │ DESC                 │ DESC                 │
//! │ "asc" / "Asc"         │ ASC                  │ ASC                  │
//! │ absent, "", "down"... │ ASC                  │ DESC                 │
//! └───────────────────────┴──────────────────────┴──────────────────────┘
//! ```
//! Listings read naturally from the top; reports show the highest values
//! first. Each endpoint picks its policy through its listing config.

use std::fmt;

use serde::Serialize;

/// Resolved sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// How an endpoint resolves a direction it does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionPolicy {
    /// Only "desc" (any case) sorts descending.
    Listing,
    /// Only "asc" (any case) sorts ascending.
    Report,
}

impl DirectionPolicy {
    /// Resolves a requested direction under this policy.
    pub fn resolve(self, requested: Option<&str>) -> SortDirection {
        let requested = requested.unwrap_or_default();
        match self {
            DirectionPolicy::Listing if requested.eq_ignore_ascii_case("desc") => {
                SortDirection::Desc
            }
            DirectionPolicy::Listing => SortDirection::Asc,
            DirectionPolicy::Report if requested.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            DirectionPolicy::Report => SortDirection::Desc,
        }
    }
}

/// Fixed mapping from public sort keys to trusted column expressions.
#[derive(Debug, Clone, Copy)]
pub struct SortWhitelist {
    entries: &'static [(&'static str, &'static str)],
    default_column: &'static str,
}

impl SortWhitelist {
    /// Creates a whitelist. Keys are matched case-insensitively.
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        default_column: &'static str,
    ) -> Self {
        SortWhitelist {
            entries,
            default_column,
        }
    }

    /// Resolves a key to its column, falling back to the default column.
    ///
    /// Matching is exact apart from ASCII case: no trimming, no prefixes.
    pub fn resolve_column(&self, key: Option<&str>) -> &'static str {
        key.and_then(|key| {
            self.entries
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, column)| *column)
        })
        .unwrap_or(self.default_column)
    }

    /// Column used when the key is absent or unknown.
    pub fn default_column(&self) -> &'static str {
        self.default_column
    }

    /// Every column this whitelist can produce, default included.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries
            .iter()
            .map(|(_, column)| *column)
            .chain(std::iter::once(self.default_column))
    }
}

/// A resolved `ORDER BY` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Renders `ORDER BY <column> <direction>`.
    pub fn order_by(&self) -> String {
        format!("ORDER BY {} {}", self.column, self.direction)
    }
}

/// Resolves a requested key and direction against a whitelist.
///
/// Never fails: unknown keys fall back to the whitelist default and unknown
/// directions fall back to the policy default.
pub fn resolve_sort(
    key: Option<&str>,
    direction: Option<&str>,
    whitelist: &SortWhitelist,
    policy: DirectionPolicy,
) -> SortSpec {
    SortSpec {
        column: whitelist.resolve_column(key),
        direction: policy.resolve(direction),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK_SORT: SortWhitelist = SortWhitelist::new(
        &[
            ("bookname", "bookname"),
            ("publisher", "publisher"),
            ("price", "price"),
            ("bookid", "bookid"),
        ],
        "bookid",
    );

    #[test]
    fn test_key_resolution_is_case_insensitive_exact() {
        assert_eq!(BOOK_SORT.resolve_column(Some("price")), "price");
        assert_eq!(BOOK_SORT.resolve_column(Some("PRICE")), "price");
        assert_eq!(BOOK_SORT.resolve_column(Some("BookName")), "bookname");
        assert_eq!(BOOK_SORT.resolve_column(Some("pri")), "bookid");
        assert_eq!(BOOK_SORT.resolve_column(Some(" price")), "bookid");
        assert_eq!(BOOK_SORT.resolve_column(None), "bookid");
    }

    #[test]
    fn test_injection_attempts_resolve_to_default() {
        for hostile in [
            "id; DROP TABLE x",
            "price; DELETE FROM Book",
            "price DESC, (SELECT 1)",
            "bookname--",
            "'",
            "",
        ] {
            let spec = resolve_sort(Some(hostile), Some("desc"), &BOOK_SORT, DirectionPolicy::Listing);
            assert_eq!(spec.column, "bookid", "input {hostile:?}");
            assert!(BOOK_SORT.columns().any(|c| c == spec.column));
        }
    }

    #[test]
    fn test_listing_policy_defaults_to_ascending() {
        let policy = DirectionPolicy::Listing;
        assert_eq!(policy.resolve(Some("desc")), SortDirection::Desc);
        assert_eq!(policy.resolve(Some("DESC")), SortDirection::Desc);
        assert_eq!(policy.resolve(Some("DeSc")), SortDirection::Desc);
        assert_eq!(policy.resolve(Some("asc")), SortDirection::Asc);
        assert_eq!(policy.resolve(Some("descending")), SortDirection::Asc);
        assert_eq!(policy.resolve(Some(" desc")), SortDirection::Asc);
        assert_eq!(policy.resolve(Some("")), SortDirection::Asc);
        assert_eq!(policy.resolve(None), SortDirection::Asc);
    }

    #[test]
    fn test_report_policy_defaults_to_descending() {
        let policy = DirectionPolicy::Report;
        assert_eq!(policy.resolve(Some("asc")), SortDirection::Asc);
        assert_eq!(policy.resolve(Some("ASC")), SortDirection::Asc);
        assert_eq!(policy.resolve(Some("desc")), SortDirection::Desc);
        assert_eq!(policy.resolve(Some("ascending")), SortDirection::Desc);
        assert_eq!(policy.resolve(Some("up")), SortDirection::Desc);
        assert_eq!(policy.resolve(None), SortDirection::Desc);
    }

    #[test]
    fn test_order_by_rendering() {
        let spec = resolve_sort(Some("price"), Some("desc"), &BOOK_SORT, DirectionPolicy::Listing);
        assert_eq!(spec.order_by(), "ORDER BY price DESC");
    }
}
