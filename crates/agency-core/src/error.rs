//! # Error Types
//!
//! Domain-specific error types for agency-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  agency-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  agency-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CLI (anyhow)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A numeric field could not be read and the tally runs in strict mode.
    ///
    /// ## When This Occurs
    /// - `totalAmount: "abc"` on a purchase record
    /// - `taxAmount: true` on a sale record
    ///
    /// In lenient mode the same field is coerced to zero and reported as a
    /// warning instead.
    #[error("Malformed {field} on {record} #{index}: {value:?}")]
    MalformedAmount {
        record: String,
        index: usize,
        field: String,
        value: String,
    },

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Sale is not in a state that allows the requested operation.
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// Sale has exceeded maximum allowed lines.
    #[error("Sale cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// An invoice document does not add up.
    #[error("Invoice {invoice_number} is inconsistent: {reason}")]
    InconsistentInvoice {
        invoice_number: String,
        reason: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Date range with `from` after `to`.
    #[error("date range is inverted: {from} is after {to}")]
    InvertedRange { from: String, to: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
