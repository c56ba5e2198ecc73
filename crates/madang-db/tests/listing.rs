//! End-to-end listing behavior against the sample bookstore.

use chrono::NaiveDate;
use madang_core::listing::{BookFilter, CustomerFilter};
use madang_core::query::{Listing, PageSpec, Window};
use madang_core::{BookDraft, OrderDraft};
use madang_db::{sample, Database, DbConfig, DbError};

async fn sample_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    sample::load(&db).await.unwrap();
    db
}

#[tokio::test]
async fn pages_partition_the_flat_listing() {
    let db = sample_db().await;
    let books = db.books();

    let flat = books
        .list(&BookFilter::default(), Some("bookname"), Some("desc"), Window::All)
        .await
        .unwrap();
    let expected: Vec<i64> = flat.items().iter().map(|b| b.bookid).collect();

    let mut collected = Vec::new();
    let mut page = 1;
    loop {
        let listing = books
            .list(
                &BookFilter::default(),
                Some("bookname"),
                Some("desc"),
                Window::Page(PageSpec::new(page, 3)),
            )
            .await
            .unwrap();
        let Listing::Page(envelope) = listing else {
            panic!("expected a page");
        };
        assert_eq!(envelope.total_items, 10);
        assert_eq!(envelope.total_pages, 4);
        collected.extend(envelope.items.iter().map(|b| b.bookid));
        if !envelope.has_next {
            break;
        }
        page += 1;
    }

    assert_eq!(page, 4);
    assert_eq!(collected, expected);
}

#[tokio::test]
async fn page_past_the_end_is_empty_but_counted() {
    let db = sample_db().await;
    let listing = db
        .customers()
        .list(&CustomerFilter::default(), None, None, Window::Page(PageSpec::new(9, 10)))
        .await
        .unwrap();
    let Listing::Page(envelope) = listing else {
        panic!("expected a page");
    };
    assert!(envelope.items.is_empty());
    assert_eq!(envelope.total_items, 5);
    assert_eq!(envelope.total_pages, 1);
    assert!(!envelope.has_next);
    assert!(envelope.has_previous);
}

#[tokio::test]
async fn hostile_sort_falls_back_to_default_column() {
    let db = sample_db().await;
    let listing = db
        .books()
        .list(
            &BookFilter::default(),
            Some("price; DROP TABLE Book"),
            Some("sideways"),
            Window::All,
        )
        .await
        .unwrap();
    let ids: Vec<i64> = listing.items().iter().map(|b| b.bookid).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    assert_eq!(db.books().count().await.unwrap(), 10);
}

#[tokio::test]
async fn filter_values_are_bound_not_spliced() {
    let db = sample_db().await;
    let filter = BookFilter {
        title: Some("' OR '1'='1".into()),
        ..Default::default()
    };
    let listing = db.books().list(&filter, None, None, Window::All).await.unwrap();
    assert!(listing.items().is_empty());
}

#[tokio::test]
async fn padded_title_matches_like_trimmed_title() {
    let db = sample_db().await;
    let search = |title: &str| BookFilter {
        title: Some(title.to_string()),
        ..Default::default()
    };

    let trimmed = db.books().list(&search("축구"), None, None, Window::All).await.unwrap();
    let padded = db.books().list(&search(" 축구 "), None, None, Window::All).await.unwrap();
    assert_eq!(trimmed.items().len(), 3);
    assert_eq!(padded.items(), trimmed.items());
}

#[tokio::test]
async fn filtered_second_page_by_price_desc() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let books = db.books();
    for i in 0..25 {
        let draft = BookDraft {
            bookname: format!("Learning java vol. {}", i + 1),
            publisher: "한빛미디어".to_string(),
            price: 10_000 + i,
        };
        books.create(&draft).await.unwrap();
    }
    // Too cheap, and wrong title.
    for (bookname, price) in [("java 입문", 9_000), ("Rust in Action", 30_000)] {
        let draft = BookDraft {
            bookname: bookname.to_string(),
            publisher: "한빛미디어".to_string(),
            price,
        };
        books.create(&draft).await.unwrap();
    }

    let filter = BookFilter {
        title: Some("java".into()),
        min_price: Some(10_000),
        ..Default::default()
    };
    let listing = books
        .list(&filter, Some("price"), Some("desc"), Window::Page(PageSpec::new(2, 10)))
        .await
        .unwrap();
    let Listing::Page(envelope) = listing else {
        panic!("expected a page");
    };

    assert_eq!(envelope.page, 2);
    assert_eq!(envelope.page_size, 10);
    assert_eq!(envelope.total_items, 25);
    assert_eq!(envelope.total_pages, 3);
    assert!(envelope.has_next);
    assert!(envelope.has_previous);
    assert_eq!(envelope.items.len(), 10);
    assert_eq!(envelope.items[0].price, 10_014);
    assert_eq!(envelope.items[9].price, 10_005);
}

#[tokio::test]
async fn new_order_flows_into_reports() {
    let db = sample_db().await;
    let today = NaiveDate::from_ymd_opt(2014, 8, 2).unwrap();
    db.orders()
        .create(
            &OrderDraft {
                custid: 5,
                bookid: 9,
                saleprice: 7500,
            },
            today,
        )
        .await
        .unwrap();

    let overview = db.stats().overview().await.unwrap();
    assert_eq!(overview.total_orders, 11);
    assert_eq!(overview.total_revenue, 125_500);

    let august = db.stats().top_customers("2014-08", 10).await.unwrap();
    assert_eq!(august.len(), 1);
    assert_eq!(august[0].name, "박세리");

    let months = db.stats().monthly_sales(12, today).await.unwrap();
    let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(labels, vec!["2014-07", "2014-08"]);

    // The book is now referenced by an order.
    assert!(matches!(
        db.books().delete(9).await,
        Err(DbError::ForeignKeyViolation { .. })
    ));
}
