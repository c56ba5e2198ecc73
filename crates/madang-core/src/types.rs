//! # Domain Types
//!
//! Entities and report rows of the bookstore.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │    Customer     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bookid         │◄┐ │  custid         │◄──│  custid (FK)    │       │
//! │  │  bookname       │ └─│─────────────────│───│  bookid (FK)    │       │
//! │  │  publisher      │   │  name, address  │   │  saleprice      │       │
//! │  │  price          │   │  phone, role    │   │  orderdate      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Report rows: OrderDetail, RecentOrder, CustomerSales, PublisherSales, │
//! │  BookSales, Bestseller, MonthlySales, SegmentSummary, Overview, ...    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All wire names are camelCase. Prices are whole won (`i64`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::access::Role;

// =============================================================================
// Book
// =============================================================================

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub bookid: i64,
    pub bookname: String,
    pub publisher: String,
    /// List price.
    pub price: i64,
}

/// Payload for creating or replacing a book.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub bookname: String,
    pub publisher: String,
    pub price: i64,
}

/// Sales figures for one book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookSalesSummary {
    pub sales_count: i64,
    pub avg_price: f64,
    pub max_price: i64,
    pub min_price: i64,
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub custid: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}

/// Payload for creating or replacing a customer's contact details.
///
/// The role is never taken from this payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Order totals for one customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrderStats {
    pub order_count: i64,
    pub total_amount: i64,
    pub avg_amount: f64,
}

// =============================================================================
// Order
// =============================================================================

/// A single book sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub orderid: i64,
    pub custid: i64,
    pub bookid: i64,
    /// Price actually paid (may differ from the book's list price).
    pub saleprice: i64,
    #[ts(as = "String")]
    pub orderdate: NaiveDate,
}

/// Payload for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub custid: i64,
    pub bookid: i64,
    pub saleprice: i64,
}

/// An order joined with its book, as shown in a customer's order history.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub orderid: i64,
    pub custid: i64,
    pub bookid: i64,
    pub saleprice: i64,
    #[ts(as = "String")]
    pub orderdate: NaiveDate,
    pub bookname: String,
    pub publisher: String,
    pub list_price: i64,
}

/// A row of the recent-orders feed.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    #[ts(as = "String")]
    pub orderdate: NaiveDate,
    pub customer_name: String,
    pub bookname: String,
    pub saleprice: i64,
}

// =============================================================================
// Report Rows
// =============================================================================

/// Store-wide totals for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_books: i64,
    pub total_customers: i64,
    pub total_orders: i64,
    pub total_revenue: i64,
    pub avg_sale_price: f64,
}

/// A book ranked by number of orders.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bestseller {
    pub bookname: String,
    pub publisher: String,
    pub sales_count: i64,
}

/// Order totals per customer (customers without orders included).
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSales {
    pub name: String,
    pub order_count: i64,
    pub total_amount: i64,
    pub avg_amount: f64,
}

/// Catalog size and sales per publisher.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PublisherSales {
    pub publisher: String,
    pub book_count: i64,
    pub sales_count: i64,
    pub total_revenue: i64,
}

/// Sales per book (books without orders included).
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookSales {
    pub bookname: String,
    pub publisher: String,
    pub price: i64,
    pub sales_count: i64,
    pub avg_sale_price: f64,
}

/// Order volume for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    /// `YYYY-MM`
    pub month: String,
    pub order_count: i64,
    pub total_revenue: i64,
    pub avg_price: f64,
}

// =============================================================================
// Customer Segments
// =============================================================================

/// Spend tier of a customer.
///
/// ## Thresholds (total spend, inclusive)
/// ```text
/// ≥ 100,000  → Vip
/// ≥  50,000  → Excellent
/// ≥  10,000  → Regular
///    below   → New
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    Vip,
    Excellent,
    Regular,
    New,
}

impl CustomerSegment {
    /// Segments from highest to lowest tier.
    pub const ALL: [CustomerSegment; 4] = [
        CustomerSegment::Vip,
        CustomerSegment::Excellent,
        CustomerSegment::Regular,
        CustomerSegment::New,
    ];

    /// Minimum total spend for this tier.
    pub const fn threshold(self) -> i64 {
        match self {
            CustomerSegment::Vip => 100_000,
            CustomerSegment::Excellent => 50_000,
            CustomerSegment::Regular => 10_000,
            CustomerSegment::New => 0,
        }
    }

    /// Label stored in SQL results.
    pub const fn as_str(self) -> &'static str {
        match self {
            CustomerSegment::Vip => "vip",
            CustomerSegment::Excellent => "excellent",
            CustomerSegment::Regular => "regular",
            CustomerSegment::New => "new",
        }
    }

    /// Tier for a customer's total spend.
    pub fn for_total(total: i64) -> Self {
        CustomerSegment::ALL
            .into_iter()
            .find(|segment| total >= segment.threshold())
            .unwrap_or(CustomerSegment::New)
    }
}

/// Number of customers and revenue in one segment.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub segment: CustomerSegment,
    pub customer_count: i64,
    pub total_revenue: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
