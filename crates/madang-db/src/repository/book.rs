//! # Book Repository
//!
//! Catalog search, CRUD and per-book sales figures.
//!
//! ## Search
//! ```text
//! ?title=축구&priceMax=10000&sortBy=price
//!       │
//!       ▼
//! BookFilter ──► BOOKS.query() ──► SELECT bookid, bookname, publisher, price
//!                                  FROM Book
//!                                  WHERE bookname LIKE ? AND price <= ?
//!                                  ORDER BY price ASC
//!                                  params: ["%축구%", 10000]
//! ```

use madang_core::listing::{BookFilter, BOOKS};
use madang_core::query::{Listing, SqlValue, Window};
use madang_core::{Book, BookDraft, BookSalesSummary};
use tracing::{debug, info};

use crate::engine::QueryRunner;
use crate::error::{DbError, DbResult};

/// Repository for book database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.books();
///
/// let page = repo.list(&filter, Some("price"), Some("desc"), Window::Page(spec)).await?;
/// let book = repo.get(3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BookRepository {
    runner: QueryRunner,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(runner: QueryRunner) -> Self {
        BookRepository { runner }
    }

    /// Searches the catalog.
    ///
    /// ## Arguments
    /// * `filter` - Title / publisher substrings and price bounds
    /// * `sort_by` - One of bookname, publisher, price, bookid (else bookid)
    /// * `direction` - "desc" for descending, anything else ascending
    /// * `window` - Page, top-N, or everything
    pub async fn list(
        &self,
        filter: &BookFilter,
        sort_by: Option<&str>,
        direction: Option<&str>,
        window: Window,
    ) -> DbResult<Listing<Book>> {
        let query = BOOKS.query(filter, sort_by, direction);
        debug!(filter = ?filter, sort = %query.sort().order_by(), "Listing books");
        self.runner.fetch_listing(&query, window).await
    }

    /// Gets a book by id.
    ///
    /// ## Returns
    /// * `Ok(Book)` - Book found
    /// * `Err(DbError::NotFound)` - No such book
    pub async fn get(&self, bookid: i64) -> DbResult<Book> {
        self.runner
            .fetch_optional(
                "SELECT bookid, bookname, publisher, price FROM Book WHERE bookid = ?",
                &[SqlValue::Int(bookid)],
            )
            .await?
            .ok_or_else(|| DbError::not_found("Book", bookid))
    }

    /// Distinct publishers, alphabetically.
    pub async fn publishers(&self) -> DbResult<Vec<String>> {
        self.runner
            .fetch_column("SELECT DISTINCT publisher FROM Book ORDER BY publisher", &[])
            .await
    }

    /// Sales count and sale-price spread for one book.
    ///
    /// A book with no orders reports zeros rather than an error.
    pub async fn sales_summary(&self, bookid: i64) -> DbResult<BookSalesSummary> {
        self.get(bookid).await?;
        self.runner
            .fetch_one(
                "SELECT COUNT(*) AS sales_count, \
                 IFNULL(AVG(saleprice), 0.0) AS avg_price, \
                 IFNULL(MAX(saleprice), 0) AS max_price, \
                 IFNULL(MIN(saleprice), 0) AS min_price \
                 FROM Orders WHERE bookid = ?",
                &[SqlValue::Int(bookid)],
            )
            .await
    }

    /// Number of books in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let counts: Vec<i64> = self
            .runner
            .fetch_column("SELECT COUNT(*) FROM Book", &[])
            .await?;
        Ok(counts.first().copied().unwrap_or(0))
    }

    /// Adds a book. The id is allocated by SQLite (current max + 1).
    pub async fn create(&self, draft: &BookDraft) -> DbResult<Book> {
        let result = self
            .runner
            .execute(
                "INSERT INTO Book (bookname, publisher, price) VALUES (?, ?, ?)",
                &[
                    SqlValue::from(draft.bookname.trim()),
                    SqlValue::from(draft.publisher.trim()),
                    SqlValue::Int(draft.price),
                ],
            )
            .await?;

        let bookid = result.last_insert_rowid();
        info!(bookid, bookname = %draft.bookname, "Book created");
        self.get(bookid).await
    }

    /// Replaces a book's name, publisher and price.
    pub async fn update(&self, bookid: i64, draft: &BookDraft) -> DbResult<Book> {
        let result = self
            .runner
            .execute(
                "UPDATE Book SET bookname = ?, publisher = ?, price = ? WHERE bookid = ?",
                &[
                    SqlValue::from(draft.bookname.trim()),
                    SqlValue::from(draft.publisher.trim()),
                    SqlValue::Int(draft.price),
                    SqlValue::Int(bookid),
                ],
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", bookid));
        }

        info!(bookid, "Book updated");
        self.get(bookid).await
    }

    /// Removes a book.
    ///
    /// Fails with [`DbError::ForeignKeyViolation`] while orders reference it.
    pub async fn delete(&self, bookid: i64) -> DbResult<()> {
        let result = self
            .runner
            .execute("DELETE FROM Book WHERE bookid = ?", &[SqlValue::Int(bookid)])
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", bookid));
        }

        info!(bookid, "Book deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::sample;
    use madang_core::PageSpec;

    async fn sample_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sample::load(&db).await.unwrap();
        db
    }

    fn draft(name: &str, publisher: &str, price: i64) -> BookDraft {
        BookDraft {
            bookname: name.to_string(),
            publisher: publisher.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn test_search_by_title_and_price() {
        let db = sample_db().await;
        let filter = BookFilter {
            title: Some("축구".into()),
            max_price: Some(15000),
            ..Default::default()
        };
        let listing = db
            .books()
            .list(&filter, Some("price"), None, Window::All)
            .await
            .unwrap();
        let names: Vec<&str> = listing.items().iter().map(|b| b.bookname.as_str()).collect();
        assert_eq!(names, vec!["축구의 역사", "축구아는 여자"]);
    }

    #[tokio::test]
    async fn test_paged_listing() {
        let db = sample_db().await;
        let listing = db
            .books()
            .list(&BookFilter::default(), None, None, Window::Page(PageSpec::new(2, 4)))
            .await
            .unwrap();
        match listing {
            Listing::Page(page) => {
                assert_eq!(page.total_items, 10);
                assert_eq!(page.total_pages, 3);
                let ids: Vec<i64> = page.items.iter().map(|b| b.bookid).collect();
                assert_eq!(ids, vec![5, 6, 7, 8]);
                assert!(page.has_next);
                assert!(page.has_previous);
            }
            Listing::All(_) => panic!("expected a page"),
        }
    }

    #[tokio::test]
    async fn test_get_missing_book() {
        let db = sample_db().await;
        assert!(matches!(
            db.books().get(999).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_publishers_sorted_and_distinct() {
        let db = sample_db().await;
        let publishers = db.books().publishers().await.unwrap();
        let mut sorted = publishers.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(publishers, sorted);
        assert!(publishers.contains(&"굿스포츠".to_string()));
    }

    #[tokio::test]
    async fn test_create_allocates_next_id() {
        let db = sample_db().await;
        let book = db
            .books()
            .create(&draft("러스트 프로그래밍", "한빛미디어", 32000))
            .await
            .unwrap();
        assert_eq!(book.bookid, 11);
        assert_eq!(book.price, 32000);
        assert_eq!(db.books().count().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = sample_db().await;
        let repo = db.books();
        let book = repo.create(&draft("임시", "출판사", 1000)).await.unwrap();

        let updated = repo
            .update(book.bookid, &draft("수정됨", "출판사", 2000))
            .await
            .unwrap();
        assert_eq!(updated.bookname, "수정됨");
        assert_eq!(updated.price, 2000);

        repo.delete(book.bookid).await.unwrap();
        assert!(matches!(
            repo.delete(book.bookid).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update(book.bookid, &draft("x", "y", 1)).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_ordered_book_is_conflict() {
        let db = sample_db().await;
        let err = db.books().delete(1).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_sales_summary() {
        let db = sample_db().await;
        // Book 10 (Olympic Champions) sold at 12000 and 7000.
        let summary = db.books().sales_summary(10).await.unwrap();
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.max_price, 12000);
        assert_eq!(summary.min_price, 7000);
        assert!((summary.avg_price - 9500.0).abs() < f64::EPSILON);

        // Book 4 (골프 바이블) was never ordered.
        let unsold = db.books().sales_summary(4).await.unwrap();
        assert_eq!(unsold, BookSalesSummary::default());
    }
}
