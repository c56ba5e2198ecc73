//! HTTP behavior of the router against the sample bookstore.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use madang_db::{sample, Database, DbConfig};
use madang_server::config::ServerConfig;
use madang_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const SESSION: &str = "x-session-id";

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    sample::load(&db).await.unwrap();
    let state = AppState::new(db, ServerConfig::default())
        .with_today(NaiveDate::from_ymd_opt(2014, 7, 10).unwrap());
    build_router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = session {
        builder = builder.header(SESSION, id);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

async fn login(app: &Router, custid: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/customers/login",
        None,
        Some(json!({ "custid": custid })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["sessionId"].as_str().unwrap().to_string()
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn health_reports_database_up() {
    let app = app().await;
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "UP");
    assert_eq!(body["data"]["database"]["status"], "UP");
}

#[tokio::test]
async fn books_are_flat_unless_paging_is_requested() {
    let app = app().await;

    let (status, body) = get(&app, "/api/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    let (_, body) = get(&app, "/api/books?page=2&pageSize=3").await;
    let page = &body["data"];
    assert_eq!(page["items"].as_array().unwrap().len(), 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["pageSize"], 3);
    assert_eq!(page["totalItems"], 10);
    assert_eq!(page["totalPages"], 4);
    assert_eq!(page["hasNext"], true);
    assert_eq!(page["hasPrevious"], true);

    let (_, body) = get(&app, "/api/books?page=1").await;
    assert_eq!(body["data"]["pageSize"], 20);
    assert_eq!(body["data"]["totalPages"], 1);
}

#[tokio::test]
async fn keyword_searches_titles() {
    let app = app().await;
    let (_, body) = get(&app, "/api/books?keyword=%EC%B6%95%EA%B5%AC&sortBy=price&direction=desc").await;
    let prices: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["price"].as_i64().unwrap())
        .collect();
    assert_eq!(prices, vec![22000, 13000, 7000]);
}

#[tokio::test]
async fn blank_title_falls_back_to_keyword() {
    let app = app().await;

    let (_, body) = get(&app, "/api/books?title=%20&keyword=%EC%B6%95%EA%B5%AC").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = get(&app, "/api/books?title=&keyword=%EC%B6%95%EA%B5%AC").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // "박" matches 박지성 and 박세리.
    let (_, body) = get(&app, "/api/customers?name=%20%20&keyword=%EB%B0%95").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn garbage_paging_values_are_normalized() {
    let app = app().await;
    let (status, body) = get(&app, "/api/customers?page=abc&pageSize=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["pageSize"], 1);
    assert_eq!(body["data"]["totalPages"], 5);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn missing_book_uses_error_envelope() {
    let app = app().await;
    let (status, body) = get(&app, "/api/books/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["error"], "Book not found: 99");

    let (status, body) = get(&app, "/api/books/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn month_reports_require_a_valid_month() {
    let app = app().await;

    let (status, body) = get(&app, "/api/stats/top-customers").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = get(&app, "/api/stats/books-by-month?month=2014-13").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/stats/top-customers?month=2014-07&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["박지성", "추신수"]);
}

// =============================================================================
// Sessions and Capabilities
// =============================================================================

#[tokio::test]
async fn login_returns_session_in_body_and_header() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/customers/login")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "custid": 2 }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let header = response
        .headers()
        .get(SESSION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["sessionId"], header.as_str());
    assert_eq!(body["data"]["customer"]["name"], "김연아");
    assert_eq!(body["data"]["customer"]["role"], "user");

    let (status, _) = send(&app, Method::POST, "/api/customers/login", None, Some(json!({ "custid": 42 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_writes_require_admin() {
    let app = app().await;
    let draft = json!({ "bookname": "테니스 입문", "publisher": "굿스포츠", "price": 9000 });

    let (status, body) = send(&app, Method::POST, "/api/books", None, Some(draft.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let user = login(&app, 2).await;
    let (status, body) = send(&app, Method::POST, "/api/books", Some(&user), Some(draft.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let admin = login(&app, 1).await;
    let (status, body) = send(&app, Method::POST, "/api/books", Some(&admin), Some(draft)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bookid"], 11);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(&admin),
        Some(json!({ "bookname": "", "publisher": "굿스포츠", "price": 9000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // Book 1 has an order.
    let (status, body) = send(&app, Method::DELETE, "/api/books/1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn order_history_is_private_to_owner_and_staff() {
    let app = app().await;

    let (status, _) = get(&app, "/api/orders?custid=1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other = login(&app, 2).await;
    let (status, _) = send(&app, Method::GET, "/api/orders?custid=1", Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/orders", Some(&other), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let admin = login(&app, 1).await;
    let (status, body) = send(&app, Method::GET, "/api/orders?custid=3", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["orderid"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![10, 8, 4]);

    let (_, body) = send(&app, Method::GET, "/api/orders/stats?custid=2", Some(&other), None).await;
    assert_eq!(body["data"]["orderCount"], 2);
    assert_eq!(body["data"]["totalAmount"], 15000);
}

#[tokio::test]
async fn customer_places_and_cancels_own_order() {
    let app = app().await;
    let session = login(&app, 5).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&session),
        Some(json!({ "custid": 5, "bookid": 9, "saleprice": 7500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orderid"], 11);
    assert_eq!(body["data"]["orderdate"], "2014-07-10");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/orders/11",
        Some(&session),
        Some(json!({ "custid": 5, "saleprice": 7000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["saleprice"], 7000);

    // Order 1 belongs to customer 1.
    let (status, _) = send(&app, Method::DELETE, "/api/orders/1?custid=5", Some(&session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/orders/11?custid=5", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/stats/overview").await;
    assert_eq!(body["data"]["totalOrders"], 10);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = app().await;
    let session = login(&app, 3).await;

    let (status, _) = send(&app, Method::GET, "/api/orders?custid=3", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/api/customers/logout", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["loggedOut"], true);

    let (status, _) = send(&app, Method::GET, "/api/orders?custid=3", Some(&session), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_admins_change_roles() {
    let app = app().await;
    let admin = login(&app, 1).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/customers/2/role",
        Some(&admin),
        Some(json!({ "role": "manager" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "manager");

    // A manager is staff, but not an admin.
    let manager = login(&app, 2).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/customers/3/role",
        Some(&manager),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/orders?custid=4", Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app().await;
    let request = Request::builder()
        .uri("/api/books")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
