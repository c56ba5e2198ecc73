//! # HTTP Routes
//!
//! ## Route Table
//! ```text
//! /api/health                          GET
//! /api/books                           GET  POST(admin)
//! /api/books/publishers                GET
//! /api/books/{id}                      GET  PUT(admin)  DELETE(admin)
//! /api/books/{id}/stats                GET
//! /api/customers                       GET  POST
//! /api/customers/login                 POST
//! /api/customers/logout                POST
//! /api/customers/{id}                  GET  PUT(self|admin)  DELETE(admin)
//! /api/customers/{id}/role             PUT(admin only)
//! /api/orders?custid=                  GET(self|admin)  POST(self|admin)
//! /api/orders/stats?custid=            GET(self|admin)
//! /api/orders/recent                   GET
//! /api/orders/{id}                     PUT(self|admin)  DELETE(self|admin)
//! /api/stats/{report}                  GET
//! ```
//!
//! ## Listing Parameters
//! Pagination applies if and only if `page` or `pageSize` is present;
//! otherwise the full result is returned as a plain array. Numbers that do
//! not parse are treated as absent.

pub mod books;
pub mod customers;
pub mod health;
pub mod orders;
pub mod stats;

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use madang_core::query::{PageSpec, Window};
use madang_core::Principal;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::session::SESSION_HEADER;
use crate::AppState;

/// All `/api` routes.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        // Books
        .route("/books", get(books::list).post(books::create))
        .route("/books/publishers", get(books::publishers))
        .route(
            "/books/{id}",
            get(books::get).put(books::update).delete(books::delete),
        )
        .route("/books/{id}/stats", get(books::stats))
        // Customers
        .route("/customers", get(customers::list).post(customers::create))
        .route("/customers/login", post(customers::login))
        .route("/customers/logout", post(customers::logout))
        .route(
            "/customers/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/customers/{id}/role", put(customers::set_role))
        // Orders
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/stats", get(orders::stats))
        .route("/orders/recent", get(orders::recent))
        .route("/orders/{id}", put(orders::update).delete(orders::delete))
        // Statistics
        .route("/stats/overview", get(stats::overview))
        .route("/stats/bestsellers", get(stats::bestsellers))
        .route("/stats/weekly-bestsellers", get(stats::weekly_bestsellers))
        .route("/stats/recent", get(orders::recent))
        .route("/stats/customers", get(stats::customers))
        .route("/stats/publishers", get(stats::publishers))
        .route("/stats/books", get(stats::books))
        .route("/stats/monthly", get(stats::monthly))
        .route("/stats/customer-segments", get(stats::customer_segments))
        .route("/stats/top-customers", get(stats::top_customers))
        .route("/stats/publishers-by-month", get(stats::publishers_by_month))
        .route("/stats/books-by-month", get(stats::books_by_month))
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Every query parameter the API understands, kept as raw text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub title: Option<String>,
    pub keyword: Option<String>,
    pub publisher: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub limit: Option<String>,
    pub months: Option<String>,
    pub month: Option<String>,
    pub custid: Option<String>,
}

/// Text input with blank values treated as absent.
pub fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Parses an optional integer, treating blank or malformed input as absent.
pub fn int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

impl Params {
    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn direction(&self) -> Option<&str> {
        self.direction.as_deref()
    }

    /// `Window::Page` when `page` or `pageSize` was sent, else `Window::All`.
    pub fn window(&self, default_page_size: u32) -> Window {
        if self.page.is_none() && self.page_size.is_none() {
            return Window::All;
        }
        Window::Page(PageSpec::new(
            int(&self.page).unwrap_or(1),
            int(&self.page_size).unwrap_or(i64::from(default_page_size)),
        ))
    }

    /// The `custid` parameter, which some order routes require.
    pub fn required_custid(&self) -> ApiResult<i64> {
        int(&self.custid).ok_or_else(|| ApiError::validation("custid is required"))
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// The session principal, if the request carried a live `X-Session-Id`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Principal>);

impl CurrentUser {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let principal = match id {
            Some(id) => state.sessions.lookup(id).await,
            None => None,
        };
        Ok(CurrentUser(principal))
    }
}

/// Unwraps a JSON body, reporting malformed input in the API envelope.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

/// Unwraps a numeric path id.
pub fn path_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::validation("id must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> Params {
        Params {
            page: page.map(String::from),
            page_size: page_size.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_window_only_when_paging_requested() {
        assert_eq!(params(None, None).window(20), Window::All);
        assert_eq!(
            params(Some("2"), None).window(20),
            Window::Page(PageSpec::new(2, 20))
        );
        assert_eq!(
            params(None, Some("5")).window(20),
            Window::Page(PageSpec::new(1, 5))
        );
    }

    #[test]
    fn test_malformed_numbers_are_normalized() {
        assert_eq!(
            params(Some("abc"), Some("-3")).window(10),
            Window::Page(PageSpec::new(1, 1))
        );
        assert_eq!(
            params(Some("0"), Some("500")).window(10),
            Window::Page(PageSpec::new(1, 100))
        );
        assert_eq!(int(&Some(" 42 ".into())), Some(42));
        assert_eq!(int(&Some("".into())), None);
    }

    #[test]
    fn test_blank_text_is_absent() {
        assert_eq!(text(&Some("  ".into())), None);
        assert_eq!(text(&None), None);
        assert_eq!(text(&Some(" java ".into())), Some(" java ".to_string()));
    }

    #[test]
    fn test_required_custid() {
        assert!(Params::default().required_custid().is_err());
        let p = Params {
            custid: Some("3".into()),
            ..Default::default()
        };
        assert_eq!(p.required_custid().unwrap(), 3);
    }
}
