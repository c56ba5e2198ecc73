//! Order routes.
//!
//! Everything that reads or changes one customer's orders needs a session
//! belonging to that customer, or a staff session.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use madang_core::listing::CUSTOMER_ORDERS;
use madang_core::query::{clamp_limit, Listing};
use madang_core::validation::validate_sale_price;
use madang_core::{access, CustomerOrderStats, Order, OrderDetail, OrderDraft, RecentOrder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{body, int, path_id, CurrentUser, Params};
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::AppState;

/// Rows returned by the recent-orders feed when `limit` is absent.
pub const DEFAULT_RECENT_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct PriceUpdate {
    pub custid: i64,
    pub saleprice: i64,
}

/// `GET /api/orders?custid=`
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Listing<OrderDetail>>> {
    let custid = params.required_custid()?;
    access::require_self_or_admin(user.principal(), custid)?;

    let orders = state
        .db
        .orders()
        .list_for_customer(
            custid,
            params.sort_by(),
            params.direction(),
            params.window(CUSTOMER_ORDERS.default_page_size),
        )
        .await?;
    Ok(ApiResponse::ok(orders))
}

/// `GET /api/orders/stats?custid=`
pub async fn stats(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<CustomerOrderStats>> {
    let custid = params.required_custid()?;
    access::require_self_or_admin(user.principal(), custid)?;
    Ok(ApiResponse::ok(state.db.orders().customer_stats(custid).await?))
}

/// `GET /api/orders/recent` and `GET /api/stats/recent`
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<RecentOrder>>> {
    let limit = clamp_limit(int(&params.limit).unwrap_or(DEFAULT_RECENT_LIMIT));
    let orders = state
        .db
        .orders()
        .recent(limit, params.sort_by(), params.direction())
        .await?;
    Ok(ApiResponse::ok(orders))
}

/// `POST /api/orders`
///
/// The order is dated today.
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> ApiResult<ApiResponse<Order>> {
    let draft = body(payload)?;
    access::require_self_or_admin(user.principal(), draft.custid)?;
    validate_sale_price(draft.saleprice)?;
    let order = state.db.orders().create(&draft, state.today()).await?;
    Ok(ApiResponse::ok(order))
}

/// `PUT /api/orders/{id}`
///
/// Only the sale price changes; the order must belong to `custid`.
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PriceUpdate>, JsonRejection>,
) -> ApiResult<ApiResponse<Order>> {
    let orderid = path_id(id)?;
    let PriceUpdate { custid, saleprice } = body(payload)?;
    access::require_self_or_admin(user.principal(), custid)?;
    validate_sale_price(saleprice)?;
    let order = state
        .db
        .orders()
        .update_price(orderid, custid, saleprice)
        .await?;
    Ok(ApiResponse::ok(order))
}

/// `DELETE /api/orders/{id}?custid=`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Value>> {
    let orderid = path_id(id)?;
    let custid = params.required_custid()?;
    access::require_self_or_admin(user.principal(), custid)?;
    state.db.orders().delete(orderid, custid).await?;
    Ok(ApiResponse::ok(json!({ "orderid": orderid })))
}
