//! # Sample Data
//!
//! The classic Madang bookstore data set: 10 books, 5 customers and 10
//! orders from July 2014. Used by the `seed` binary and by tests.
//!
//! Rows are inserted with explicit ids inside one transaction, so a fresh
//! database always ends up with ids 1..=N and new rows continue at N + 1.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;

/// (bookid, bookname, publisher, price)
pub const BOOKS: &[(i64, &str, &str, i64)] = &[
    (1, "축구의 역사", "굿스포츠", 7000),
    (2, "축구아는 여자", "나무수", 13000),
    (3, "축구의 이해", "대한미디어", 22000),
    (4, "골프 바이블", "대한미디어", 35000),
    (5, "피겨 교본", "굿스포츠", 8000),
    (6, "역도 단계별기술", "굿스포츠", 6000),
    (7, "야구의 추억", "이상미디어", 20000),
    (8, "야구를 부탁해", "이상미디어", 13000),
    (9, "올림픽 이야기", "삼성당", 7500),
    (10, "Olympic Champions", "Pearson", 13000),
];

/// (custid, name, address, phone, role)
pub const CUSTOMERS: &[(i64, &str, &str, Option<&str>, &str)] = &[
    (1, "박지성", "영국 맨체스타", Some("000-5000-0001"), "admin"),
    (2, "김연아", "대한민국 서울", Some("000-6000-0001"), "user"),
    (3, "장미란", "대한민국 강원도", Some("000-7000-0001"), "user"),
    (4, "추신수", "미국 클리블랜드", Some("000-8000-0001"), "user"),
    (5, "박세리", "대한민국 대전", None, "user"),
];

/// (orderid, custid, bookid, saleprice, orderdate)
pub const ORDERS: &[(i64, i64, i64, i64, &str)] = &[
    (1, 1, 1, 6000, "2014-07-01"),
    (2, 1, 3, 21000, "2014-07-03"),
    (3, 2, 5, 8000, "2014-07-03"),
    (4, 3, 6, 6000, "2014-07-04"),
    (5, 4, 7, 20000, "2014-07-05"),
    (6, 1, 2, 12000, "2014-07-07"),
    (7, 4, 8, 13000, "2014-07-07"),
    (8, 3, 10, 12000, "2014-07-08"),
    (9, 2, 10, 7000, "2014-07-09"),
    (10, 3, 8, 13000, "2014-07-10"),
];

/// Row counts written by [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSummary {
    pub books: usize,
    pub customers: usize,
    pub orders: usize,
}

/// Inserts the sample data set.
///
/// Expects empty tables; existing rows with the same ids make the insert
/// fail with a unique violation and nothing is written.
pub async fn load(db: &Database) -> DbResult<SampleSummary> {
    insert_all(db.pool()).await
}

async fn insert_all(pool: &SqlitePool) -> DbResult<SampleSummary> {
    let mut tx = pool.begin().await?;

    for &(bookid, bookname, publisher, price) in BOOKS {
        sqlx::query("INSERT INTO Book (bookid, bookname, publisher, price) VALUES (?, ?, ?, ?)")
            .bind(bookid)
            .bind(bookname)
            .bind(publisher)
            .bind(price)
            .execute(&mut *tx)
            .await?;
    }

    for &(custid, name, address, phone, role) in CUSTOMERS {
        sqlx::query(
            "INSERT INTO Customer (custid, name, address, phone, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(custid)
        .bind(name)
        .bind(address)
        .bind(phone)
        .bind(role)
        .execute(&mut *tx)
        .await?;
    }

    for &(orderid, custid, bookid, saleprice, orderdate) in ORDERS {
        sqlx::query(
            "INSERT INTO Orders (orderid, custid, bookid, saleprice, orderdate) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(orderid)
        .bind(custid)
        .bind(bookid)
        .bind(saleprice)
        .bind(orderdate)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let summary = SampleSummary {
        books: BOOKS.len(),
        customers: CUSTOMERS.len(),
        orders: ORDERS.len(),
    };
    info!(
        books = summary.books,
        customers = summary.customers,
        orders = summary.orders,
        "Sample data loaded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_load_into_empty_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let summary = load(&db).await.unwrap();
        assert_eq!(summary.books, 10);
        assert_eq!(db.books().count().await.unwrap(), 10);
        assert_eq!(db.customers().count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_second_load_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        load(&db).await.unwrap();
        let err = load(&db).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(db.books().count().await.unwrap(), 10);
    }
}
