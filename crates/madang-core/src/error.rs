//! # Error Types
//!
//! Domain-specific error types for madang-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  madang-core errors (this file)                                        │
//! │  ├── CoreError        - Umbrella for domain failures                   │
//! │  ├── ValidationError  - Write payload / report parameter failures      │
//! │  └── AccessError      - Missing session or insufficient role           │
//! │                                                                         │
//! │  madang-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (apps/server)                                             │
//! │  └── ApiError         - What the browser sees (serialized)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listing inputs (filters, sort keys, page numbers) never produce errors.
//! They are normalized by the query engine instead.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised before any SQL is executed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Capability check failed (wraps AccessError).
    #[error("Access denied: {0}")]
    Access(#[from] AccessError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised for create/update payloads and for report parameters whose format
/// matters (such as `month`).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., month that is not YYYY-MM).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Access Error
// =============================================================================

/// Capability check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No session, or the session has expired.
    #[error("Login required")]
    Unauthenticated,

    /// Session exists but its role does not allow the operation.
    #[error("Insufficient permissions: {required} required")]
    Forbidden { required: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "bookname".to_string(),
        };
        assert_eq!(err.to_string(), "bookname is required");

        let err = ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: 10_000_000,
        };
        assert_eq!(err.to_string(), "price must be between 0 and 10000000");
    }

    #[test]
    fn test_access_error_messages() {
        assert_eq!(AccessError::Unauthenticated.to_string(), "Login required");
        let err = AccessError::Forbidden {
            required: "admin".to_string(),
        };
        assert_eq!(err.to_string(), "Insufficient permissions: admin required");
    }

    #[test]
    fn test_conversions_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = AccessError::Unauthenticated.into();
        assert!(matches!(core_err, CoreError::Access(_)));
    }
}
