//! # Statistics Repository
//!
//! Read-only sales reports for the dashboard.
//!
//! ## Report Families
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sortable listings      customer_sales / publisher_sales / book_sales  │
//! │  (ListingConfig)        top_customers (month filter + limit)           │
//! │                                                                         │
//! │  fixed-shape reports    overview, bestsellers, weekly_bestsellers,     │
//! │  (statement constants)  monthly_sales, customer_segments,              │
//! │                         publishers_by_month, books_by_month            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Relative-date reports take `today` from the caller, so the repository
//! never reads the clock.
//!
//! The `*_by_month` reports put the month condition inside the `LEFT JOIN`
//! so that publishers and books without sales in that month still appear
//! with zero counts. Top customers filters in `WHERE` and only lists
//! customers who bought something that month.

use chrono::NaiveDate;
use madang_core::listing::{MonthFilter, BOOK_SALES, CUSTOMER_SALES, PUBLISHER_SALES};
use madang_core::query::{Listing, SqlValue, Window};
use madang_core::{
    BookSales, Bestseller, CustomerSales, CustomerSegment, MonthlySales, Overview, PublisherSales,
    SegmentSummary,
};
use tracing::debug;

use crate::engine::QueryRunner;
use crate::error::DbResult;

/// Longest window accepted by [`StatsRepository::monthly_sales`].
pub const MAX_REPORT_MONTHS: u32 = 120;

const OVERVIEW: &str = "SELECT \
    (SELECT COUNT(*) FROM Book) AS total_books, \
    (SELECT COUNT(*) FROM Customer) AS total_customers, \
    (SELECT COUNT(*) FROM Orders) AS total_orders, \
    (SELECT IFNULL(SUM(saleprice), 0) FROM Orders) AS total_revenue, \
    (SELECT IFNULL(AVG(saleprice), 0.0) FROM Orders) AS avg_sale_price";

const BESTSELLERS: &str = "SELECT b.bookname AS bookname, b.publisher AS publisher, \
    COUNT(*) AS sales_count \
    FROM Orders o JOIN Book b ON o.bookid = b.bookid \
    GROUP BY b.bookid, b.bookname, b.publisher \
    ORDER BY sales_count DESC \
    LIMIT ?";

const WEEKLY_BESTSELLERS: &str = "SELECT b.bookname AS bookname, b.publisher AS publisher, \
    COUNT(*) AS sales_count \
    FROM Orders o JOIN Book b ON o.bookid = b.bookid \
    WHERE o.orderdate >= date(?, '-7 days') \
    GROUP BY b.bookid, b.bookname, b.publisher \
    ORDER BY sales_count DESC \
    LIMIT ?";

const MONTHLY_SALES: &str = "SELECT strftime('%Y-%m', orderdate) AS month, \
    COUNT(*) AS order_count, \
    IFNULL(SUM(saleprice), 0) AS total_revenue, \
    IFNULL(AVG(saleprice), 0.0) AS avg_price \
    FROM Orders \
    WHERE orderdate >= date(?, ?) \
    GROUP BY strftime('%Y-%m', orderdate) \
    ORDER BY month ASC";

const PUBLISHERS_BY_MONTH: &str = "SELECT b.publisher AS publisher, \
    COUNT(DISTINCT b.bookid) AS book_count, \
    COUNT(o.orderid) AS sales_count, \
    IFNULL(SUM(o.saleprice), 0) AS total_revenue \
    FROM Book b \
    LEFT JOIN Orders o ON b.bookid = o.bookid AND strftime('%Y-%m', o.orderdate) = ? \
    GROUP BY b.publisher \
    ORDER BY total_revenue DESC";

const BOOKS_BY_MONTH: &str = "SELECT b.bookname AS bookname, b.publisher AS publisher, \
    b.price AS price, \
    COUNT(o.orderid) AS sales_count, \
    IFNULL(AVG(o.saleprice), 0.0) AS avg_sale_price \
    FROM Book b \
    LEFT JOIN Orders o ON b.bookid = o.bookid AND strftime('%Y-%m', o.orderdate) = ? \
    GROUP BY b.bookid, b.bookname, b.publisher, b.price \
    ORDER BY sales_count DESC";

/// Renders the segment report.
///
/// Thresholds are bound first (one per tier above `new`), then the optional
/// month cutoff inside the join.
fn segment_sql(up_to_month: bool) -> String {
    let cutoff = if up_to_month {
        " AND strftime('%Y-%m', o.orderdate) <= ?"
    } else {
        ""
    };
    format!(
        "SELECT CASE \
            WHEN total_amount >= ? THEN '{vip}' \
            WHEN total_amount >= ? THEN '{excellent}' \
            WHEN total_amount >= ? THEN '{regular}' \
            ELSE '{new}' END AS segment, \
         COUNT(*) AS customer_count, \
         IFNULL(SUM(total_amount), 0) AS total_revenue \
         FROM (SELECT c.custid, IFNULL(SUM(o.saleprice), 0) AS total_amount \
               FROM Customer c LEFT JOIN Orders o ON c.custid = o.custid{cutoff} \
               GROUP BY c.custid) AS customer_totals \
         GROUP BY segment \
         ORDER BY CASE segment \
            WHEN '{vip}' THEN 0 WHEN '{excellent}' THEN 1 WHEN '{regular}' THEN 2 ELSE 3 END",
        vip = CustomerSegment::Vip.as_str(),
        excellent = CustomerSegment::Excellent.as_str(),
        regular = CustomerSegment::Regular.as_str(),
        new = CustomerSegment::New.as_str(),
        cutoff = cutoff,
    )
}

fn date_value(date: NaiveDate) -> SqlValue {
    SqlValue::Text(date.format("%Y-%m-%d").to_string())
}

/// Repository for sales statistics.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    runner: QueryRunner,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(runner: QueryRunner) -> Self {
        StatsRepository { runner }
    }

    // =========================================================================
    // Store-wide
    // =========================================================================

    /// Totals across the whole store.
    pub async fn overview(&self) -> DbResult<Overview> {
        self.runner.fetch_one(OVERVIEW, &[]).await
    }

    /// Most-ordered books of all time.
    pub async fn bestsellers(&self, limit: u32) -> DbResult<Vec<Bestseller>> {
        self.runner
            .fetch_all(BESTSELLERS, &[SqlValue::from(limit)])
            .await
    }

    /// Most-ordered books over the seven days up to `today`.
    pub async fn weekly_bestsellers(&self, limit: u32, today: NaiveDate) -> DbResult<Vec<Bestseller>> {
        self.runner
            .fetch_all(WEEKLY_BESTSELLERS, &[date_value(today), SqlValue::from(limit)])
            .await
    }

    /// Orders and revenue per calendar month over the last `months` months,
    /// oldest month first.
    ///
    /// ## Arguments
    /// * `months` - Window length, clamped to `1..=MAX_REPORT_MONTHS`
    /// * `today` - End of the window
    pub async fn monthly_sales(&self, months: u32, today: NaiveDate) -> DbResult<Vec<MonthlySales>> {
        let months = months.clamp(1, MAX_REPORT_MONTHS);
        debug!(months, today = %today, "Monthly sales");
        self.runner
            .fetch_all(
                MONTHLY_SALES,
                &[date_value(today), SqlValue::Text(format!("-{} months", months))],
            )
            .await
    }

    /// Customers grouped into spend tiers, highest tier first.
    ///
    /// With a month, only orders placed up to the end of that month count.
    /// Tiers with no customers are omitted.
    pub async fn customer_segments(&self, month: Option<&str>) -> DbResult<Vec<SegmentSummary>> {
        let mut params: Vec<SqlValue> = CustomerSegment::ALL
            .iter()
            .filter(|segment| **segment != CustomerSegment::New)
            .map(|segment| SqlValue::Int(segment.threshold()))
            .collect();
        if let Some(month) = month {
            params.push(SqlValue::from(month));
        }
        self.runner
            .fetch_all(&segment_sql(month.is_some()), &params)
            .await
    }

    // =========================================================================
    // Sortable Reports
    // =========================================================================

    /// Order totals per customer, including customers with no orders.
    pub async fn customer_sales(
        &self,
        sort_by: Option<&str>,
        direction: Option<&str>,
        window: Window,
    ) -> DbResult<Listing<CustomerSales>> {
        let query = CUSTOMER_SALES.query(&(), sort_by, direction);
        self.runner.fetch_listing(&query, window).await
    }

    /// Catalog size and sales per publisher.
    pub async fn publisher_sales(
        &self,
        sort_by: Option<&str>,
        direction: Option<&str>,
        window: Window,
    ) -> DbResult<Listing<PublisherSales>> {
        let query = PUBLISHER_SALES.query(&(), sort_by, direction);
        self.runner.fetch_listing(&query, window).await
    }

    /// Sales per book, including unsold books.
    pub async fn book_sales(
        &self,
        sort_by: Option<&str>,
        direction: Option<&str>,
        window: Window,
    ) -> DbResult<Listing<BookSales>> {
        let query = BOOK_SALES.query(&(), sort_by, direction);
        self.runner.fetch_listing(&query, window).await
    }

    // =========================================================================
    // Month-scoped Reports
    // =========================================================================

    /// Biggest spenders in one `YYYY-MM` month.
    pub async fn top_customers(&self, month: &str, limit: u32) -> DbResult<Vec<CustomerSales>> {
        let filter = MonthFilter {
            month: Some(month.to_string()),
        };
        let query = CUSTOMER_SALES.query(&filter, Some("totalamount"), None);
        let listing = self.runner.fetch_listing(&query, Window::Limit(limit)).await?;
        Ok(listing.items().to_vec())
    }

    /// Every publisher with its sales in one month.
    pub async fn publishers_by_month(&self, month: &str) -> DbResult<Vec<PublisherSales>> {
        self.runner
            .fetch_all(PUBLISHERS_BY_MONTH, &[SqlValue::from(month)])
            .await
    }

    /// Every book with its sales in one month.
    pub async fn books_by_month(&self, month: &str) -> DbResult<Vec<BookSales>> {
        self.runner
            .fetch_all(BOOKS_BY_MONTH, &[SqlValue::from(month)])
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
