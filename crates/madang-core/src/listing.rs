//! # Listing Configurations
//!
//! One [`ListingConfig`] per listable resource. A config names the table
//! expression, the projected columns, the sort whitelist and the direction
//! policy; a [`FilterSet`] turns the request's optional inputs into a
//! [`Predicate`].
//!
//! ## Flow
//! ```text
//! BookFilter ──► FilterSet::predicate() ──┐
//!                                         ├──► ListingConfig::query() ──► SelectQuery
//! sortBy, direction ──► resolve_sort() ───┘
//! ```
//!
//! Every column that can ever reach `ORDER BY` is a `&'static str` literal
//! in this file.

use crate::query::{resolve_sort, DirectionPolicy, Predicate, SelectQuery, SortWhitelist};
use crate::{DEFAULT_BOOK_PAGE_SIZE, DEFAULT_PAGE_SIZE};

// =============================================================================
// Filters
// =============================================================================

/// Turns request inputs into a predicate, conditions in declared order.
pub trait FilterSet {
    fn predicate(&self) -> Predicate;
}

/// No filtering.
impl FilterSet for () {
    fn predicate(&self) -> Predicate {
        Predicate::new()
    }
}

/// Book search inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl FilterSet for BookFilter {
    fn predicate(&self) -> Predicate {
        Predicate::new()
            .contains("bookname LIKE ?", self.title.as_deref())
            .contains("publisher LIKE ?", self.publisher.as_deref())
            .at_bound("price >= ?", self.min_price)
            .at_bound("price <= ?", self.max_price)
    }
}

/// Customer search inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl FilterSet for CustomerFilter {
    fn predicate(&self) -> Predicate {
        Predicate::new()
            .contains("name LIKE ?", self.name.as_deref())
            .contains("phone LIKE ?", self.phone.as_deref())
            .contains("address LIKE ?", self.address.as_deref())
    }
}

/// Orders of a single customer. The customer id is always bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerOrdersFilter {
    pub custid: i64,
}

impl FilterSet for CustomerOrdersFilter {
    fn predicate(&self) -> Predicate {
        Predicate::new().require("o.custid = ?", self.custid)
    }
}

/// Restricts a sales report to orders placed in one `YYYY-MM` month.
///
/// Usable with every config whose table expression aliases orders as `o`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthFilter {
    pub month: Option<String>,
}

impl FilterSet for MonthFilter {
    fn predicate(&self) -> Predicate {
        Predicate::new().equals("strftime('%Y-%m', o.orderdate) = ?", self.month.as_deref())
    }
}

// =============================================================================
// Listing Config
// =============================================================================

/// Static description of one listable resource.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    pub from: &'static str,
    pub columns: &'static str,
    pub group_by: Option<&'static str>,
    pub sort: SortWhitelist,
    pub direction: DirectionPolicy,
    /// Page size used when the caller sends `page` without `pageSize`.
    pub default_page_size: u32,
}

impl ListingConfig {
    /// Resolves filters and sort into a ready-to-run query.
    ///
    /// ## Arguments
    /// * `filter` - Optional inputs for this resource
    /// * `sort_by` - Untrusted sort key, matched against the whitelist
    /// * `direction` - Untrusted direction, resolved by the config's policy
    pub fn query(
        &self,
        filter: &impl FilterSet,
        sort_by: Option<&str>,
        direction: Option<&str>,
    ) -> SelectQuery {
        let sort = resolve_sort(sort_by, direction, &self.sort, self.direction);
        let query = SelectQuery::new(self.from, self.columns, filter.predicate(), sort);
        match self.group_by {
            Some(keys) => query.group_by(keys),
            None => query,
        }
    }
}

// =============================================================================
// Entity Listings
// =============================================================================

/// Book catalog search.
pub const BOOKS: ListingConfig = ListingConfig {
    from: "Book",
    columns: "bookid, bookname, publisher, price",
    group_by: None,
    sort: SortWhitelist::new(
        &[
            ("bookname", "bookname"),
            ("publisher", "publisher"),
            ("price", "price"),
            ("bookid", "bookid"),
        ],
        "bookid",
    ),
    direction: DirectionPolicy::Listing,
    default_page_size: DEFAULT_BOOK_PAGE_SIZE,
};

/// Customer directory search.
pub const CUSTOMERS: ListingConfig = ListingConfig {
    from: "Customer",
    columns: "custid, name, address, phone, role",
    group_by: None,
    sort: SortWhitelist::new(
        &[
            ("name", "name"),
            ("address", "address"),
            ("phone", "phone"),
            ("custid", "custid"),
        ],
        "custid",
    ),
    direction: DirectionPolicy::Listing,
    default_page_size: DEFAULT_PAGE_SIZE,
};

/// A customer's order history with book details.
pub const CUSTOMER_ORDERS: ListingConfig = ListingConfig {
    from: "Orders o JOIN Book b ON o.bookid = b.bookid",
    columns: "o.orderid AS orderid, o.custid AS custid, o.bookid AS bookid, \
              o.saleprice AS saleprice, o.orderdate AS orderdate, \
              b.bookname AS bookname, b.publisher AS publisher, b.price AS list_price",
    group_by: None,
    sort: SortWhitelist::new(
        &[
            ("orderid", "o.orderid"),
            ("orderdate", "o.orderdate"),
            ("bookname", "b.bookname"),
            ("publisher", "b.publisher"),
            ("saleprice", "o.saleprice"),
        ],
        "o.orderdate",
    ),
    direction: DirectionPolicy::Report,
    default_page_size: DEFAULT_PAGE_SIZE,
};

/// Latest orders across the store.
pub const RECENT_ORDERS: ListingConfig = ListingConfig {
    from: "Orders o JOIN Customer c ON o.custid = c.custid JOIN Book b ON o.bookid = b.bookid",
    columns: "o.orderdate AS orderdate, c.name AS customer_name, \
              b.bookname AS bookname, o.saleprice AS saleprice",
    group_by: None,
    sort: SortWhitelist::new(
        &[
            ("orderdate", "o.orderdate"),
            ("customername", "c.name"),
            ("bookname", "b.bookname"),
            ("saleprice", "o.saleprice"),
        ],
        "o.orderdate",
    ),
    direction: DirectionPolicy::Report,
    default_page_size: DEFAULT_PAGE_SIZE,
};

// =============================================================================
// Sales Reports
// =============================================================================

/// Order totals per customer.
pub const CUSTOMER_SALES: ListingConfig = ListingConfig {
    from: "Customer c LEFT JOIN Orders o ON c.custid = o.custid",
    columns: "c.name AS name, COUNT(o.orderid) AS order_count, \
              IFNULL(SUM(o.saleprice), 0) AS total_amount, \
              IFNULL(AVG(o.saleprice), 0.0) AS avg_amount",
    group_by: Some("c.custid, c.name"),
    sort: SortWhitelist::new(
        &[
            ("name", "c.name"),
            ("ordercount", "order_count"),
            ("totalamount", "total_amount"),
            ("avgamount", "avg_amount"),
        ],
        "total_amount",
    ),
    direction: DirectionPolicy::Report,
    default_page_size: DEFAULT_PAGE_SIZE,
};

/// Catalog size and sales per publisher.
pub const PUBLISHER_SALES: ListingConfig = ListingConfig {
    from: "Book b LEFT JOIN Orders o ON b.bookid = o.bookid",
    columns: "b.publisher AS publisher, COUNT(DISTINCT b.bookid) AS book_count, \
              COUNT(o.orderid) AS sales_count, \
              IFNULL(SUM(o.saleprice), 0) AS total_revenue",
    group_by: Some("b.publisher"),
    sort: SortWhitelist::new(
        &[
            ("publisher", "b.publisher"),
            ("bookcount", "book_count"),
            ("salescount", "sales_count"),
            ("totalrevenue", "total_revenue"),
        ],
        "total_revenue",
    ),
    direction: DirectionPolicy::Report,
    default_page_size: DEFAULT_PAGE_SIZE,
};

/// Sales per book.
pub const BOOK_SALES: ListingConfig = ListingConfig {
    from: "Book b LEFT JOIN Orders o ON b.bookid = o.bookid",
    columns: "b.bookname AS bookname, b.publisher AS publisher, b.price AS price, \
              COUNT(o.orderid) AS sales_count, \
              IFNULL(AVG(o.saleprice), 0.0) AS avg_sale_price",
    group_by: Some("b.bookid, b.bookname, b.publisher, b.price"),
    sort: SortWhitelist::new(
        &[
            ("bookname", "b.bookname"),
            ("publisher", "b.publisher"),
            ("price", "b.price"),
            ("salescount", "sales_count"),
            ("avgsaleprice", "avg_sale_price"),
        ],
        "sales_count",
    ),
    direction: DirectionPolicy::Report,
    default_page_size: DEFAULT_PAGE_SIZE,
};

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PageSpec, SortDirection, SqlValue, Window};

    const ALL: [ListingConfig; 7] = [
        BOOKS,
        CUSTOMERS,
        CUSTOMER_ORDERS,
        RECENT_ORDERS,
        CUSTOMER_SALES,
        PUBLISHER_SALES,
        BOOK_SALES,
    ];

    #[test]
    fn test_book_search_example() {
        let filter = BookFilter {
            title: Some("java".into()),
            min_price: Some(10000),
            ..Default::default()
        };
        let query = BOOKS.query(&filter, Some("price"), Some("desc"));
        let window = Window::Page(PageSpec::new(2, 10));

        assert_eq!(
            query.count_sql(),
            "SELECT COUNT(*) AS total FROM Book WHERE bookname LIKE ? AND price >= ?"
        );
        assert_eq!(
            query.count_params(),
            vec![SqlValue::Text("%java%".into()), SqlValue::Int(10000)]
        );
        assert_eq!(
            query.data_sql(&window),
            "SELECT bookid, bookname, publisher, price FROM Book WHERE bookname LIKE ? AND price >= ? ORDER BY price DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            query.data_params(&window),
            vec![
                SqlValue::Text("%java%".into()),
                SqlValue::Int(10000),
                SqlValue::Int(10),
                SqlValue::Int(10),
            ]
        );
    }

    #[test]
    fn test_unfiltered_books_default_sort() {
        let query = BOOKS.query(&BookFilter::default(), None, None);
        assert_eq!(
            query.data_sql(&Window::All),
            "SELECT bookid, bookname, publisher, price FROM Book ORDER BY bookid ASC"
        );
        assert!(query.data_params(&Window::All).is_empty());
    }

    #[test]
    fn test_customer_filters_in_declared_order() {
        let filter = CustomerFilter {
            name: Some("kim".into()),
            phone: None,
            address: Some("Seoul".into()),
        };
        let query = CUSTOMERS.query(&filter, Some("name"), Some("asc"));
        assert_eq!(
            query.count_sql(),
            "SELECT COUNT(*) AS total FROM Customer WHERE name LIKE ? AND address LIKE ?"
        );
        assert_eq!(
            query.count_params(),
            vec![SqlValue::Text("%kim%".into()), SqlValue::Text("%Seoul%".into())]
        );
    }

    #[test]
    fn test_customer_orders_always_scoped() {
        let query = CUSTOMER_ORDERS.query(&CustomerOrdersFilter { custid: 4 }, None, None);
        assert_eq!(query.sort().column, "o.orderdate");
        assert_eq!(query.sort().direction, SortDirection::Desc);
        assert_eq!(query.count_params(), vec![SqlValue::Int(4)]);
        assert!(query.count_sql().ends_with("WHERE o.custid = ?"));
    }

    #[test]
    fn test_hostile_sort_keys_never_reach_sql() {
        for config in ALL {
            let query = config.query(&(), Some("1; DROP TABLE Book"), Some("desc; --"));
            let sql = query.data_sql(&Window::All);
            assert!(!sql.contains("DROP"));
            assert!(!sql.contains("--"));
            assert_eq!(query.sort().column, config.sort.default_column());
        }
    }

    #[test]
    fn test_report_direction_policy() {
        let query = PUBLISHER_SALES.query(&(), Some("salescount"), None);
        assert_eq!(query.sort().column, "sales_count");
        assert_eq!(query.sort().direction, SortDirection::Desc);

        let query = PUBLISHER_SALES.query(&(), Some("salescount"), Some("asc"));
        assert_eq!(query.sort().direction, SortDirection::Asc);
    }

    #[test]
    fn test_month_filter_on_grouped_report() {
        let filter = MonthFilter {
            month: Some("2024-07".into()),
        };
        let query = CUSTOMER_SALES.query(&filter, None, None);
        assert_eq!(
            query.data_sql(&Window::Limit(10)),
            "SELECT c.name AS name, COUNT(o.orderid) AS order_count, \
             IFNULL(SUM(o.saleprice), 0) AS total_amount, \
             IFNULL(AVG(o.saleprice), 0.0) AS avg_amount \
             FROM Customer c LEFT JOIN Orders o ON c.custid = o.custid \
             WHERE strftime('%Y-%m', o.orderdate) = ? \
             GROUP BY c.custid, c.name ORDER BY total_amount DESC LIMIT ?"
        );
        assert_eq!(
            query.data_params(&Window::Limit(10)),
            vec![SqlValue::Text("2024-07".into()), SqlValue::Int(10)]
        );
    }

    #[test]
    fn test_month_filter_absent_adds_nothing() {
        assert!(MonthFilter::default().predicate().is_empty());
    }
}
