//! # Query Runner
//!
//! Execution side of the listing engine. madang-core decides the SQL text and
//! the params; this module binds them, reports them to the
//! [`StatementObserver`], and runs them.
//!
//! ## Paginated Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch_page(query, spec)                                                │
//! │                                                                         │
//! │  BEGIN ─────────────────────────────────────────────────┐  one         │
//! │    SELECT COUNT(*) AS total FROM .. WHERE ..    params  │  connection, │
//! │    SELECT .. FROM .. WHERE .. ORDER BY .. LIMIT ? OFFSET ?  one        │
//! │                                     params + size + offset  snapshot   │
//! │  COMMIT ────────────────────────────────────────────────┘              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PageEnvelope::assemble(items, spec, total)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Both statements share the predicate params, so `totalItems` and `items`
//! always describe the same filtered set.

use std::sync::Arc;

use madang_core::query::{Listing, PageEnvelope, PageSpec, SelectQuery, SqlValue, Window};
use sqlx::sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow};
use sqlx::{Arguments, FromRow, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::observer::{StatementKind, StatementObserver};

/// Binds params in placeholder order.
fn arguments<'q>(params: &[SqlValue]) -> DbResult<SqliteArguments<'q>> {
    let mut args = SqliteArguments::default();
    for param in params {
        let bound = match param {
            SqlValue::Int(value) => args.add(*value),
            SqlValue::Text(value) => args.add(value.clone()),
            SqlValue::Null => args.add(Option::<String>::None),
        };
        bound.map_err(|e| DbError::QueryFailed(e.to_string()))?;
    }
    Ok(args)
}

/// Pool handle that routes every statement through the observer.
#[derive(Debug, Clone)]
pub struct QueryRunner {
    pool: SqlitePool,
    observer: Arc<dyn StatementObserver>,
}

impl QueryRunner {
    /// Creates a runner over `pool`.
    pub fn new(pool: SqlitePool, observer: Arc<dyn StatementObserver>) -> Self {
        QueryRunner { pool, observer }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Plain Statements
    // =========================================================================

    /// Runs a SELECT and maps every row.
    pub async fn fetch_all<T>(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.observer.observe(StatementKind::Query, sql, params);
        let rows = sqlx::query_as_with::<Sqlite, T, _>(sql, arguments(params)?)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Runs a SELECT expected to return at most one row.
    pub async fn fetch_optional<T>(&self, sql: &str, params: &[SqlValue]) -> DbResult<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.observer.observe(StatementKind::Query, sql, params);
        let row = sqlx::query_as_with::<Sqlite, T, _>(sql, arguments(params)?)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Runs a SELECT that always returns exactly one row (aggregates).
    pub async fn fetch_one<T>(&self, sql: &str, params: &[SqlValue]) -> DbResult<T>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.observer.observe(StatementKind::Query, sql, params);
        let row = sqlx::query_as_with::<Sqlite, T, _>(sql, arguments(params)?)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Runs a SELECT returning a single column.
    pub async fn fetch_column<T>(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<T>>
    where
        (T,): for<'r> FromRow<'r, SqliteRow>,
        T: Send + Unpin,
    {
        self.observer.observe(StatementKind::Query, sql, params);
        let values = sqlx::query_scalar_with::<Sqlite, T, _>(sql, arguments(params)?)
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }

    /// Runs an INSERT, UPDATE or DELETE.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> DbResult<SqliteQueryResult> {
        self.observer.observe(StatementKind::Update, sql, params);
        let result = sqlx::query_with::<Sqlite, _>(sql, arguments(params)?)
            .execute(&self.pool)
            .await?;
        Ok(result)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Runs a listing for any window.
    ///
    /// A page window yields [`Listing::Page`]; `All` and `Limit` yield the
    /// flat sequence.
    pub async fn fetch_listing<T>(&self, query: &SelectQuery, window: Window) -> DbResult<Listing<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        match window {
            Window::Page(spec) => Ok(Listing::Page(self.fetch_page(query, spec).await?)),
            Window::All | Window::Limit(_) => {
                let sql = query.data_sql(&window);
                let params = query.data_params(&window);
                Ok(Listing::All(self.fetch_all(&sql, &params).await?))
            }
        }
    }

    /// Runs the count and the page inside one transaction and assembles the
    /// envelope.
    ///
    /// ## Arguments
    /// * `query` - Resolved listing (predicate + sort)
    /// * `spec` - Clamped page request
    pub async fn fetch_page<T>(&self, query: &SelectQuery, spec: PageSpec) -> DbResult<PageEnvelope<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let window = Window::Page(spec);
        let count_sql = query.count_sql();
        let count_params = query.count_params();
        let data_sql = query.data_sql(&window);
        let data_params = query.data_params(&window);

        let mut tx = self.pool.begin().await?;

        self.observer
            .observe(StatementKind::Query, &count_sql, &count_params);
        let total: i64 = sqlx::query_scalar_with::<Sqlite, i64, _>(&count_sql, arguments(&count_params)?)
            .fetch_one(&mut *tx)
            .await?;

        self.observer
            .observe(StatementKind::Query, &data_sql, &data_params);
        let items: Vec<T> = sqlx::query_as_with::<Sqlite, T, _>(&data_sql, arguments(&data_params)?)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            page = spec.page(),
            page_size = spec.page_size(),
            total,
            returned = items.len(),
            "Listing page fetched"
        );

        Ok(PageEnvelope::assemble(items, &spec, total))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::testing::RecordingObserver;
    use crate::pool::{Database, DbConfig};
    use madang_core::listing::{BookFilter, BOOKS};
    use madang_core::Book;

    async fn runner_with_books(count: i64) -> (QueryRunner, Arc<RecordingObserver>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for i in 1..=count {
            sqlx::query("INSERT INTO Book (bookid, bookname, publisher, price) VALUES (?, ?, ?, ?)")
                .bind(i)
                .bind(format!("Book {i:03}"))
                .bind(if i % 2 == 0 { "Even Press" } else { "Odd House" })
                .bind(i * 1000)
                .execute(db.pool())
                .await
                .unwrap();
        }
        let observer = Arc::new(RecordingObserver::default());
        let runner = QueryRunner::new(db.pool().clone(), observer.clone());
        (runner, observer)
    }

    #[test]
    fn test_arguments_accept_every_value_kind() {
        assert!(arguments(&[SqlValue::Text("%a%".into()), SqlValue::Int(3), SqlValue::Null]).is_ok());
        assert!(arguments(&[]).is_ok());
    }

    #[tokio::test]
    async fn test_page_matches_count() {
        let (runner, _) = runner_with_books(101).await;
        let query = BOOKS.query(&BookFilter::default(), None, None);

        let page: PageEnvelope<Book> = runner.fetch_page(&query, PageSpec::new(6, 20)).await.unwrap();
        assert_eq!(page.total_items, 101);
        assert_eq!(page.total_pages, 6);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].bookid, 101);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn test_filtered_count_uses_same_predicate() {
        let (runner, observer) = runner_with_books(30).await;
        let filter = BookFilter {
            publisher: Some("Even".into()),
            min_price: Some(10_000),
            ..Default::default()
        };
        let query = BOOKS.query(&filter, Some("price"), Some("desc"));

        let page: PageEnvelope<Book> = runner.fetch_page(&query, PageSpec::new(1, 5)).await.unwrap();
        // Even ids from 10 to 30.
        assert_eq!(page.total_items, 11);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].price, 30_000);
        assert!(page.items.iter().all(|b| b.publisher == "Even Press"));

        let statements = observer.statements.lock().unwrap();
        assert_eq!(statements.len(), 2);
        let (_, _, count_params) = &statements[0];
        let (_, _, data_params) = &statements[1];
        assert_eq!(&data_params[..count_params.len()], &count_params[..]);
    }

    #[tokio::test]
    async fn test_empty_result_has_zero_pages() {
        let (runner, _) = runner_with_books(3).await;
        let filter = BookFilter {
            title: Some("no such title".into()),
            ..Default::default()
        };
        let query = BOOKS.query(&filter, None, None);
        let page: PageEnvelope<Book> = runner.fetch_page(&query, PageSpec::new(1, 10)).await.unwrap();
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn test_unpaginated_listing_is_flat() {
        let (runner, observer) = runner_with_books(4).await;
        let query = BOOKS.query(&BookFilter::default(), Some("bookid"), Some("desc"));
        let listing: Listing<Book> = runner.fetch_listing(&query, Window::All).await.unwrap();
        let ids: Vec<i64> = listing.items().iter().map(|b| b.bookid).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
        assert!(matches!(listing, Listing::All(_)));
        assert_eq!(observer.statements.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_limit_window() {
        let (runner, _) = runner_with_books(10).await;
        let query = BOOKS.query(&BookFilter::default(), Some("price"), Some("desc"));
        let listing: Listing<Book> = runner.fetch_listing(&query, Window::Limit(3)).await.unwrap();
        assert_eq!(listing.items().len(), 3);
        assert_eq!(listing.items()[0].price, 10_000);
    }

    #[tokio::test]
    async fn test_execute_reports_update_kind() {
        let (runner, observer) = runner_with_books(1).await;
        let result = runner
            .execute(
                "UPDATE Book SET price = ? WHERE bookid = ?",
                &[SqlValue::Int(500), SqlValue::Int(1)],
            )
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 1);
        let statements = observer.statements.lock().unwrap();
        assert_eq!(statements[0].0, StatementKind::Update);
    }
}
