//! # Error Types
//!
//! Domain-specific error types for configurator-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  configurator-core errors (this file)                                  │
//! │  ├── CoreError        - Catalog loading and command failures           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  configurator-checkout errors (separate crate)                         │
//! │  └── CheckoutError    - Config and submission failures                 │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the rendering layer sees (serialized)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! A set of dropdown values that matches no variant is a *resolution miss*.
//! It is reported as `None` / [`crate::ChoiceOutcome::Incomplete`], never as
//! an error, because it is the normal state of a half-filled form.

use thiserror::Error;

use crate::types::VariantId;

// =============================================================================
// Core Error
// =============================================================================

/// Core engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The catalog document could not be parsed.
    #[error("Invalid catalog document: {0}")]
    CatalogParse(String),

    /// The catalog parsed but is structurally unusable.
    ///
    /// ## When This Occurs
    /// - Two components share a handle
    /// - A component has an empty handle
    /// - The catalog has no components at all
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// No component with this handle exists in the catalog.
    #[error("Component not found: {0}")]
    UnknownComponent(String),

    /// The component exists but has no variant with this id.
    #[error("Variant {variant_id} not found on component {handle}")]
    UnknownVariant { handle: String, variant_id: VariantId },

    /// Quantity exceeds the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u64, max: u32 },

    /// An additional selection already holds the maximum number of lines.
    #[error("Component {handle} cannot have more than {max} additional lines")]
    TooManyLines { handle: String, max: usize },

    /// A sold-out variant was about to be sent to the commerce backend.
    ///
    /// ## User Workflow
    /// ```text
    /// Summary lists "Aluminium / Silver" (sold out, red icon)
    ///      │
    ///      ▼
    /// build_cart_payload()
    ///      │
    ///      ▼
    /// UnavailableVariant { component: "case", variant_id: 2, .. }
    ///      │
    ///      ▼
    /// Nothing is sent; the selection stays listed for the user
    /// ```
    #[error("{title} ({component}) is sold out")]
    UnavailableVariant {
        component: String,
        variant_id: VariantId,
        title: String,
    },

    /// There is nothing to submit.
    #[error("Configuration has no selected components")]
    EmptyConfiguration,

    /// Price arithmetic left the i64 range.
    #[error("Price calculation overflowed")]
    PriceOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::CatalogParse(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate component handle).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
