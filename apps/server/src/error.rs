//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Server                             │
//! │                                                                         │
//! │  Handler: Result<ApiResponse<T>, ApiError>                             │
//! │       │                                                                 │
//! │       ├── AccessError::Unauthenticated ────────► 401 UNAUTHORIZED      │
//! │       ├── AccessError::Forbidden ──────────────► 403 FORBIDDEN         │
//! │       ├── ValidationError ─────────────────────► 400 VALIDATION_ERROR  │
//! │       ├── DbError::NotFound ───────────────────► 404 NOT_FOUND         │
//! │       ├── DbError::{Unique,ForeignKey,Check} ──► 409 CONFLICT          │
//! │       └── DbError::{Query,Connection,..} ──────► 500 DATABASE_ERROR    │
//! │                                                                         │
//! │  Body: {"success": false, "error": "<message>", "code": "<CODE>"}      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures are logged with their detail and reported to the client
//! with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use madang_core::{AccessError, CoreError, ValidationError};
use madang_db::DbError;
use serde::Serialize;
use tracing::{error, warn};

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing, unknown or expired session (401)
    Unauthorized,

    /// Session role does not allow the operation (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Constraint violation on write (409)
    Conflict,

    /// Storage failure (500)
    DatabaseError,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error returned from handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    code: ErrorCode,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
            code: self.code,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::not_found(format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                warn!(%message, "Foreign key violation");
                ApiError::new(
                    ErrorCode::Conflict,
                    "Referenced record is missing or still in use",
                )
            }
            DbError::CheckViolation { message } => {
                warn!(%message, "Check constraint violation");
                ApiError::new(ErrorCode::Conflict, "Value violates a table constraint")
            }
            DbError::ConnectionFailed(e) => {
                error!(error = %e, "Database connection failed");
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!(error = %e, "Database migration failed");
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!(error = %e, "Database query failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!(error = %e, "Internal database error");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        let code = match err {
            AccessError::Unauthenticated => ErrorCode::Unauthorized,
            AccessError::Forbidden { .. } => ErrorCode::Forbidden,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::Access(e) => e.into(),
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
