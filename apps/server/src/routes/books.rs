//! Catalog routes.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use madang_core::listing::{BookFilter, BOOKS};
use madang_core::query::Listing;
use madang_core::validation::validate_book;
use madang_core::{access, Book, BookDraft, BookSalesSummary};
use serde_json::{json, Value};

use super::{body, int, path_id, text, CurrentUser, Params};
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::AppState;

impl Params {
    /// Book search inputs. `keyword` stands in for a missing or blank `title`.
    fn book_filter(&self) -> BookFilter {
        BookFilter {
            title: text(&self.title).or_else(|| text(&self.keyword)),
            publisher: self.publisher.clone(),
            min_price: int(&self.price_min),
            max_price: int(&self.price_max),
        }
    }
}

/// `GET /api/books`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Listing<Book>>> {
    let books = state
        .db
        .books()
        .list(
            &params.book_filter(),
            params.sort_by(),
            params.direction(),
            params.window(BOOKS.default_page_size),
        )
        .await?;
    Ok(ApiResponse::ok(books))
}

/// `GET /api/books/publishers`
pub async fn publishers(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse<Vec<String>>> {
    Ok(ApiResponse::ok(state.db.books().publishers().await?))
}

/// `GET /api/books/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<Book>> {
    let bookid = path_id(id)?;
    Ok(ApiResponse::ok(state.db.books().get(bookid).await?))
}

/// `GET /api/books/{id}/stats`
pub async fn stats(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<BookSalesSummary>> {
    let bookid = path_id(id)?;
    Ok(ApiResponse::ok(state.db.books().sales_summary(bookid).await?))
}

/// `POST /api/books` (admin)
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<BookDraft>, JsonRejection>,
) -> ApiResult<ApiResponse<Book>> {
    access::require_admin(user.principal())?;
    let draft = body(payload)?;
    validate_book(&draft)?;
    Ok(ApiResponse::ok(state.db.books().create(&draft).await?))
}

/// `PUT /api/books/{id}` (admin)
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookDraft>, JsonRejection>,
) -> ApiResult<ApiResponse<Book>> {
    access::require_admin(user.principal())?;
    let bookid = path_id(id)?;
    let draft = body(payload)?;
    validate_book(&draft)?;
    Ok(ApiResponse::ok(state.db.books().update(bookid, &draft).await?))
}

/// `DELETE /api/books/{id}` (admin)
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<Value>> {
    access::require_admin(user.principal())?;
    let bookid = path_id(id)?;
    state.db.books().delete(bookid).await?;
    Ok(ApiResponse::ok(json!({ "bookid": bookid })))
}
