//! # Validation Module
//!
//! Input validation utilities for Agency Books.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI / client form                                            │
//! │  ├── Argument parsing (clap), decimal parsing                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Drafts (PurchaseDraft, SaleDraft)                            │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (qr_code, invoice_number)                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agency_core::validation::{validate_name, validate_quantity};
//!
//! assert!(validate_name("item name", "Green Tea 200g").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_PRICE_CENTS, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name (items, customers, purchase slips).
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a QR payload string.
///
/// ## Rules
/// - 4 to 64 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use agency_core::validation::validate_qr_code;
///
/// assert!(validate_qr_code("AGY-20261018-1a2b3c4d").is_ok());
/// assert!(validate_qr_code("abc").is_err());
/// assert!(validate_qr_code("has space").is_err());
/// ```
pub fn validate_qr_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "qr code".to_string(),
        });
    }

    if code.len() < 4 {
        return Err(ValidationError::TooShort {
            field: "qr code".to_string(),
            min: 4,
        });
    }

    if code.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "qr code".to_string(),
            max: 64,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "qr code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional e-mail address (very loosely: `x@y`).
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a packet or piece quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates pieces per packet. Zero is allowed and means "not sold by the
/// piece"; the per-piece price is then zero.
pub fn validate_pieces_per_packet(pieces: i64) -> ValidationResult<()> {
    if !(0..=MAX_QUANTITY).contains(&pieces) {
        return Err(ValidationError::OutOfRange {
            field: "pieces per packet".to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free samples)
/// - Must not exceed [`MAX_PRICE_CENTS`]
///
/// ```rust
/// use agency_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(10_000_000_001).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ```rust
/// use agency_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
