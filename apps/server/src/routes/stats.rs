//! Read-only statistics routes.
//!
//! ## Defaults
//! ```text
//! bestsellers, weekly-bestsellers   limit  5
//! top-customers                     limit  10   (month required)
//! monthly                           months 12   (1..=120)
//! publishers-by-month, books-by-month           (month required)
//! customer-segments                             (month optional)
//! ```

use std::sync::Arc;

use axum::extract::{Query, State};
use madang_core::listing::{BOOK_SALES, CUSTOMER_SALES, PUBLISHER_SALES};
use madang_core::query::{clamp_limit, Listing};
use madang_core::validation::validate_month;
use madang_core::{
    Bestseller, BookSales, CustomerSales, MonthlySales, Overview, PublisherSales, SegmentSummary,
    ValidationError,
};
use madang_db::repository::stats::MAX_REPORT_MONTHS;

use super::{int, Params};
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::AppState;

pub const DEFAULT_BESTSELLER_LIMIT: i64 = 5;
pub const DEFAULT_TOP_CUSTOMER_LIMIT: i64 = 10;
pub const DEFAULT_REPORT_MONTHS: i64 = 12;

impl Params {
    fn limit_or(&self, default: i64) -> u32 {
        clamp_limit(int(&self.limit).unwrap_or(default))
    }

    fn months_or(&self, default: i64) -> u32 {
        let months = int(&self.months)
            .unwrap_or(default)
            .clamp(1, i64::from(MAX_REPORT_MONTHS));
        u32::try_from(months).unwrap_or(MAX_REPORT_MONTHS)
    }

    /// The validated `month`, failing when absent.
    fn required_month(&self) -> Result<String, ValidationError> {
        validate_month(self.month.as_deref().unwrap_or_default())
    }

    /// The validated `month`, or `None` when absent or blank.
    fn optional_month(&self) -> Result<Option<String>, ValidationError> {
        match self.month.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(month) => validate_month(month).map(Some),
        }
    }
}

/// `GET /api/stats/overview`
pub async fn overview(State(state): State<Arc<AppState>>) -> ApiResult<ApiResponse<Overview>> {
    Ok(ApiResponse::ok(state.db.stats().overview().await?))
}

/// `GET /api/stats/bestsellers`
pub async fn bestsellers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<Bestseller>>> {
    let limit = params.limit_or(DEFAULT_BESTSELLER_LIMIT);
    Ok(ApiResponse::ok(state.db.stats().bestsellers(limit).await?))
}

/// `GET /api/stats/weekly-bestsellers`
pub async fn weekly_bestsellers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<Bestseller>>> {
    let limit = params.limit_or(DEFAULT_BESTSELLER_LIMIT);
    let rows = state
        .db
        .stats()
        .weekly_bestsellers(limit, state.today())
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/customers`
pub async fn customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Listing<CustomerSales>>> {
    let rows = state
        .db
        .stats()
        .customer_sales(
            params.sort_by(),
            params.direction(),
            params.window(CUSTOMER_SALES.default_page_size),
        )
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/publishers`
pub async fn publishers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Listing<PublisherSales>>> {
    let rows = state
        .db
        .stats()
        .publisher_sales(
            params.sort_by(),
            params.direction(),
            params.window(PUBLISHER_SALES.default_page_size),
        )
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/books`
pub async fn books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Listing<BookSales>>> {
    let rows = state
        .db
        .stats()
        .book_sales(
            params.sort_by(),
            params.direction(),
            params.window(BOOK_SALES.default_page_size),
        )
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/monthly`
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<MonthlySales>>> {
    let months = params.months_or(DEFAULT_REPORT_MONTHS);
    let rows = state
        .db
        .stats()
        .monthly_sales(months, state.today())
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/customer-segments`
pub async fn customer_segments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<SegmentSummary>>> {
    let month = params.optional_month()?;
    let rows = state
        .db
        .stats()
        .customer_segments(month.as_deref())
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/top-customers?month=`
pub async fn top_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<CustomerSales>>> {
    let month = params.required_month()?;
    let limit = params.limit_or(DEFAULT_TOP_CUSTOMER_LIMIT);
    let rows = state.db.stats().top_customers(&month, limit).await?;
    Ok(ApiResponse::ok(rows))
}

/// `GET /api/stats/publishers-by-month?month=`
pub async fn publishers_by_month(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<PublisherSales>>> {
    let month = params.required_month()?;
    Ok(ApiResponse::ok(state.db.stats().publishers_by_month(&month).await?))
}

/// `GET /api/stats/books-by-month?month=`
pub async fn books_by_month(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<ApiResponse<Vec<BookSales>>> {
    let month = params.required_month()?;
    Ok(ApiResponse::ok(state.db.stats().books_by_month(&month).await?))
}
