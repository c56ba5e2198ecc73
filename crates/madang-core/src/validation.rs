//! # Validation Module
//!
//! Checks for write payloads and for report parameters whose format matters.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractors                                              │
//! │  └── Type validation (JSON / query deserialization)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths (in characters, so Hangul counts as one each)             │
//! │  ├── Non-negative prices                                               │
//! │  └── YYYY-MM month strings                                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Listing inputs are not validated here. Filters, sort keys and page
//! numbers are normalized by [`crate::query`].

use crate::error::ValidationError;
use crate::types::{BookDraft, CustomerDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted book title.
pub const MAX_BOOK_NAME_LEN: usize = 200;
/// Longest accepted publisher name.
pub const MAX_PUBLISHER_LEN: usize = 100;
/// Longest accepted customer name.
pub const MAX_CUSTOMER_NAME_LEN: usize = 50;
/// Longest accepted address.
pub const MAX_ADDRESS_LEN: usize = 200;
/// Longest accepted phone number.
pub const MAX_PHONE_LEN: usize = 20;

// =============================================================================
// Helpers
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    at_most(field, value, max)
}

fn at_most(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Book Validators
// =============================================================================

/// Validates a book title.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use madang_core::validation::validate_book_name;
///
/// assert!(validate_book_name("축구의 역사").is_ok());
/// assert!(validate_book_name("  ").is_err());
/// assert!(validate_book_name(&"가".repeat(201)).is_err());
/// ```
pub fn validate_book_name(name: &str) -> ValidationResult<()> {
    required("bookname", name, MAX_BOOK_NAME_LEN)
}

/// Validates a publisher name (1 to 100 characters).
pub fn validate_publisher(publisher: &str) -> ValidationResult<()> {
    required("publisher", publisher, MAX_PUBLISHER_LEN)
}

/// Validates a list price. Zero is allowed.
pub fn validate_price(price: i64) -> ValidationResult<()> {
    non_negative("price", price)
}

/// Validates a whole book payload, field by field.
pub fn validate_book(draft: &BookDraft) -> ValidationResult<()> {
    validate_book_name(&draft.bookname)?;
    validate_publisher(&draft.publisher)?;
    validate_price(draft.price)
}

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates a customer name (1 to 50 characters).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("name", name, MAX_CUSTOMER_NAME_LEN)
}

/// Validates an optional address (at most 200 characters).
pub fn validate_address(address: Option<&str>) -> ValidationResult<()> {
    address.map_or(Ok(()), |a| at_most("address", a, MAX_ADDRESS_LEN))
}

/// Validates an optional phone number (at most 20 characters).
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    phone.map_or(Ok(()), |p| at_most("phone", p, MAX_PHONE_LEN))
}

/// Validates a whole customer payload, field by field.
pub fn validate_customer(draft: &CustomerDraft) -> ValidationResult<()> {
    validate_customer_name(&draft.name)?;
    validate_address(draft.address.as_deref())?;
    validate_phone(draft.phone.as_deref())
}

// =============================================================================
// Order / Report Validators
// =============================================================================

/// Validates the price actually paid for an order.
pub fn validate_sale_price(saleprice: i64) -> ValidationResult<()> {
    non_negative("saleprice", saleprice)
}

/// Validates a `YYYY-MM` month and returns it trimmed.
///
/// ## Example
/// ```rust
/// use madang_core::validation::validate_month;
///
/// assert_eq!(validate_month("2024-07").unwrap(), "2024-07");
/// assert!(validate_month("2024-13").is_err());
/// assert!(validate_month("2024-7").is_err());
/// ```
pub fn validate_month(month: &str) -> ValidationResult<String> {
    let month = month.trim();
    if month.is_empty() {
        return Err(ValidationError::Required {
            field: "month".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "month".to_string(),
        reason: "expected YYYY-MM".to_string(),
    };

    let (year, mon) = month.split_once('-').ok_or_else(invalid)?;
    let digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(year, 4) || !digits(mon, 2) {
        return Err(invalid());
    }
    match mon.parse::<u32>() {
        Ok(1..=12) => Ok(month.to_string()),
        _ => Err(invalid()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
