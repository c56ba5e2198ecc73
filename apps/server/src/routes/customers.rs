//! Customer routes, including login and logout.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::Json;
use madang_core::listing::{CustomerFilter, CUSTOMERS};
use madang_core::query::Listing;
use madang_core::validation::validate_customer;
use madang_core::{access, Customer, CustomerDraft, Principal, Role};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{body, path_id, text, CurrentUser, Params};
use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::session::SESSION_HEADER;
use crate::AppState;

impl Params {
    /// Customer search inputs. `keyword` stands in for a missing or blank `name`.
    fn customer_filter(&self) -> CustomerFilter {
        CustomerFilter {
            name: text(&self.name).or_else(|| text(&self.keyword)),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub custid: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub customer: Customer,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// `GET /api/customers`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Listing<Customer>>> {
    let customers = state
        .db
        .customers()
        .list(
            &params.customer_filter(),
            params.sort_by(),
            params.direction(),
            params.window(CUSTOMERS.default_page_size),
        )
        .await?;
    Ok(ApiResponse::ok(customers))
}

/// `GET /api/customers/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<Customer>> {
    let custid = path_id(id)?;
    Ok(ApiResponse::ok(state.db.customers().get(custid).await?))
}

/// `POST /api/customers`
///
/// Open registration; the new customer always gets the `user` role.
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CustomerDraft>, JsonRejection>,
) -> ApiResult<ApiResponse<Customer>> {
    let draft = body(payload)?;
    validate_customer(&draft)?;
    Ok(ApiResponse::ok(state.db.customers().create(&draft).await?))
}

/// `POST /api/customers/login`
///
/// Returns the customer and a new session id, which is also sent in the
/// `X-Session-Id` header.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let LoginRequest { custid } = body(payload)?;
    let customer = state.db.customers().login(custid).await?;

    let session_id = state
        .sessions
        .create(Principal {
            custid: customer.custid,
            name: customer.name.clone(),
            role: customer.role,
        })
        .await;
    let header_value = HeaderValue::from_str(&session_id)
        .map_err(|e| ApiError::internal(format!("Invalid session id: {}", e)))?;

    Ok(ApiResponse::ok(LoginResponse {
        customer,
        session_id,
    })
    .with_header(HeaderName::from_static(SESSION_HEADER), header_value))
}

/// `POST /api/customers/logout`
///
/// Succeeds whether or not the session still existed.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<ApiResponse<Value>> {
    let id = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let ended = match id {
        Some(id) => state.sessions.remove(id).await,
        None => false,
    };
    if ended {
        info!("Session ended by logout");
    }
    Ok(ApiResponse::ok(json!({ "loggedOut": ended })))
}

/// `PUT /api/customers/{id}` (self or admin)
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CustomerDraft>, JsonRejection>,
) -> ApiResult<ApiResponse<Customer>> {
    let custid = path_id(id)?;
    access::require_self_or_admin(user.principal(), custid)?;
    let draft = body(payload)?;
    validate_customer(&draft)?;
    Ok(ApiResponse::ok(state.db.customers().update(custid, &draft).await?))
}

/// `PUT /api/customers/{id}/role` (admin role only, managers excluded)
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Customer>> {
    access::require_role(user.principal(), &[Role::Admin])?;
    let custid = path_id(id)?;
    let RoleRequest { role } = body(payload)?;

    let customers = state.db.customers();
    customers.set_role(custid, role).await?;
    Ok(ApiResponse::ok(customers.get(custid).await?))
}

/// `DELETE /api/customers/{id}` (admin)
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ApiResponse<Value>> {
    access::require_admin(user.principal())?;
    let custid = path_id(id)?;
    state.db.customers().delete(custid).await?;
    Ok(ApiResponse::ok(json!({ "custid": custid })))
}
