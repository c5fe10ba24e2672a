//! # Validation Module
//!
//! Input validation for catalog documents and engine commands.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Catalog load (once)                                                   │
//! │  ├── validate_handle()      every component handle                     │
//! │  └── validate_price()       every variant price                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Commands (every user action)                                          │
//! │  ├── validate_quantity()    select / set_quantity                      │
//! │  └── validate_bundle_id()   caller-supplied bundle ids                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Commerce backend                                                      │
//! │  └── Final say on pricing and availability                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use configurator_core::validation::{validate_handle, validate_quantity};
//!
//! validate_handle("keycaps").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a component handle.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use configurator_core::validation::validate_handle;
///
/// assert!(validate_handle("pcb").is_ok());
/// assert!(validate_handle("switch_films").is_ok());
/// assert!(validate_handle("").is_err());
/// assert!(validate_handle("has space").is_err());
/// ```
pub fn validate_handle(handle: &str) -> ValidationResult<()> {
    if handle.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "handle".to_string(),
        });
    }

    if !handle
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "handle".to_string(),
            reason: format!(
                "'{}' must contain only letters, numbers, hyphens, and underscores",
                handle
            ),
        });
    }

    Ok(())
}

/// Validates a caller-supplied bundle id.
///
/// Generated ids are UUID v4; callers replaying a bundle may pass any
/// non-empty token up to 64 characters.
pub fn validate_bundle_id(bundle_id: &str) -> ValidationResult<()> {
    let bundle_id = bundle_id.trim();

    if bundle_id.is_empty() {
        return Err(ValidationError::Required {
            field: "bundle id".to_string(),
        });
    }

    if bundle_id.len() > 64 {
        return Err(ValidationError::OutOfRange {
            field: "bundle id length".to_string(),
            min: 1,
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Summary: Extra Keycaps × [ 12 ]                                        │
/// │                                                                         │
/// │  User types 12                                                          │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(12) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty == 0?  → Error: "quantity must be positive"              │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → select / set_quantity proceeds                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a catalog price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free add-ons such as a stickers pack)
///
/// ## Example
/// ```rust
/// use configurator_core::money::Money;
/// use configurator_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_minor(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_minor(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.minor_units() < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
