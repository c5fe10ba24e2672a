//! # API Error Type
//!
//! Unified error type for protocol commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Configurator                       │
//! │                                                                         │
//! │  stdin: {"command": "select", "handle": "case", "variantId": 99}       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Session::dispatch                                               │  │
//! │  │  Result<Response, ApiError>                                      │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Engine error? ─── CoreError::UnknownVariant ──────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Checkout error? ─ CheckoutError::Rejected ────── ApiError ────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stdout: {"status": "error",                                           │
//! │           "error": {"code": "NOT_FOUND",                               │
//! │                     "message": "Variant 99 not found on component case"}}│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use configurator_checkout::CheckoutError;
use configurator_core::CoreError;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Startup / Stream Errors
// =============================================================================

/// Errors that end the process (as opposed to failing one command).
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("No catalog given: pass --catalog or set [catalog] path in the config file")]
    MissingCatalog,

    #[error("Protocol stream failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// API Error
// =============================================================================

/// Error returned from a protocol command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for protocol replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown component or variant
    NotFound,

    /// Input validation failed (bad quantity, malformed command)
    ValidationError,

    /// The catalog document is unusable
    CatalogError,

    /// A sold-out variant blocks the operation
    SoldOut,

    /// The checkout gate is closed
    NotReady,

    /// The commerce backend refused or failed the cart
    BackendError,

    /// Settings are wrong
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts engine errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::UnknownComponent(_) | CoreError::UnknownVariant { .. } => {
                ErrorCode::NotFound
            }
            CoreError::QuantityTooLarge { .. }
            | CoreError::TooManyLines { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::CatalogParse(_) | CoreError::InvalidCatalog(_) => ErrorCode::CatalogError,
            CoreError::UnavailableVariant { .. } => ErrorCode::SoldOut,
            CoreError::EmptyConfiguration => ErrorCode::NotReady,
            CoreError::PriceOverflow => {
                tracing::error!("Price overflow while building snapshot");
                ErrorCode::Internal
            }
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts checkout errors to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(core) => ApiError::from(core),
            CheckoutError::NotReady { label } => ApiError::new(ErrorCode::NotReady, label),
            other if other.is_config_error() => {
                ApiError::new(ErrorCode::ConfigError, other.to_string())
            }
            other => ApiError::new(ErrorCode::BackendError, other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
