//! # Order Repository
//!
//! Customer order history, the recent-orders feed and order writes.
//!
//! Every write is scoped by `orderid AND custid`, so a customer id that does
//! not own the order behaves exactly like a missing order.

use chrono::NaiveDate;
use madang_core::listing::{CustomerOrdersFilter, CUSTOMER_ORDERS, RECENT_ORDERS};
use madang_core::query::{Listing, SqlValue, Window};
use madang_core::{CustomerOrderStats, Order, OrderDetail, OrderDraft, RecentOrder};
use tracing::{debug, info};

use crate::engine::QueryRunner;
use crate::error::{DbError, DbResult};

/// Renders a date as stored in `Orders.orderdate`.
fn date_value(date: NaiveDate) -> SqlValue {
    SqlValue::Text(date.format("%Y-%m-%d").to_string())
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    runner: QueryRunner,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(runner: QueryRunner) -> Self {
        OrderRepository { runner }
    }

    /// Lists one customer's orders joined with their books.
    ///
    /// ## Arguments
    /// * `custid` - Customer whose history is read (always bound)
    /// * `sort_by` - orderid, orderdate, bookname, publisher or saleprice
    /// * `direction` - "asc" for ascending, anything else descending
    /// * `window` - Page or everything
    pub async fn list_for_customer(
        &self,
        custid: i64,
        sort_by: Option<&str>,
        direction: Option<&str>,
        window: Window,
    ) -> DbResult<Listing<OrderDetail>> {
        let query = CUSTOMER_ORDERS.query(&CustomerOrdersFilter { custid }, sort_by, direction);
        debug!(custid, sort = %query.sort().order_by(), "Listing customer orders");
        self.runner.fetch_listing(&query, window).await
    }

    /// Order count and spend for one customer (zeros when none).
    pub async fn customer_stats(&self, custid: i64) -> DbResult<CustomerOrderStats> {
        self.runner
            .fetch_one(
                "SELECT COUNT(*) AS order_count, \
                 IFNULL(SUM(saleprice), 0) AS total_amount, \
                 IFNULL(AVG(saleprice), 0.0) AS avg_amount \
                 FROM Orders WHERE custid = ?",
                &[SqlValue::Int(custid)],
            )
            .await
    }

    /// Latest orders across the store, capped at `limit` rows.
    pub async fn recent(
        &self,
        limit: u32,
        sort_by: Option<&str>,
        direction: Option<&str>,
    ) -> DbResult<Vec<RecentOrder>> {
        let query = RECENT_ORDERS.query(&(), sort_by, direction);
        let listing = self.runner.fetch_listing(&query, Window::Limit(limit)).await?;
        Ok(match listing {
            Listing::All(items) => items,
            Listing::Page(page) => page.items,
        })
    }

    /// Gets an order by id.
    pub async fn get(&self, orderid: i64) -> DbResult<Order> {
        self.runner
            .fetch_optional(
                "SELECT orderid, custid, bookid, saleprice, orderdate FROM Orders WHERE orderid = ?",
                &[SqlValue::Int(orderid)],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Order", orderid))
    }

    /// Places an order dated `orderdate`.
    ///
    /// Unknown customer or book ids fail with
    /// [`DbError::ForeignKeyViolation`].
    pub async fn create(&self, draft: &OrderDraft, orderdate: NaiveDate) -> DbResult<Order> {
        let result = self
            .runner
            .execute(
                "INSERT INTO Orders (custid, bookid, saleprice, orderdate) VALUES (?, ?, ?, ?)",
                &[
                    SqlValue::Int(draft.custid),
                    SqlValue::Int(draft.bookid),
                    SqlValue::Int(draft.saleprice),
                    date_value(orderdate),
                ],
            )
            .await?;

        let orderid = result.last_insert_rowid();
        info!(orderid, custid = draft.custid, bookid = draft.bookid, "Order created");
        self.get(orderid).await
    }

    /// Changes the price paid for one of a customer's orders.
    pub async fn update_price(&self, orderid: i64, custid: i64, saleprice: i64) -> DbResult<Order> {
        let result = self
            .runner
            .execute(
                "UPDATE Orders SET saleprice = ? WHERE orderid = ? AND custid = ?",
                &[
                    SqlValue::Int(saleprice),
                    SqlValue::Int(orderid),
                    SqlValue::Int(custid),
                ],
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", orderid));
        }

        info!(orderid, custid, saleprice, "Order price updated");
        self.get(orderid).await
    }

    /// Cancels one of a customer's orders.
    pub async fn delete(&self, orderid: i64, custid: i64) -> DbResult<()> {
        let result = self
            .runner
            .execute(
                "DELETE FROM Orders WHERE orderid = ? AND custid = ?",
                &[SqlValue::Int(orderid), SqlValue::Int(custid)],
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", orderid));
        }

        info!(orderid, custid, "Order deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
