//! # Checkout Error Types
//!
//! Errors raised while loading configuration or submitting a cart.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Backend             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  Rejected (4xx)         │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  ServerError (5xx)      │ │
//! │  │  CatalogLoad    │  │                 │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Readiness    │  │     Engine      │                              │
//! │  │                 │  │                 │                              │
//! │  │  NotReady       │  │  Core(CoreError)│                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use configurator_core::CoreError;
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout error type.
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configurator settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Catalog document could not be read from disk.
    #[error("Failed to read catalog {path:?}: {reason}")]
    CatalogLoadFailed { path: PathBuf, reason: String },

    // =========================================================================
    // Readiness Errors
    // =========================================================================
    /// The checkout gate is closed; carries the button label explaining why.
    #[error("Configuration is not ready for checkout: {label}")]
    NotReady { label: String },

    /// Engine error (wraps CoreError).
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Could not reach the commerce backend.
    #[error("Connection to commerce backend failed: {0}")]
    ConnectionFailed(String),

    /// The request did not finish in time.
    #[error("Commerce backend timed out: {0}")]
    Timeout(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend refused the cart (4xx).
    #[error("Cart rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend failed while handling the cart (5xx).
    #[error("Commerce backend error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response or request body could not be (de)serialized.
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CheckoutError::Timeout(err.to_string())
        } else if err.is_decode() || err.is_body() {
            CheckoutError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            CheckoutError::InvalidConfig(err.to_string())
        } else {
            CheckoutError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for CheckoutError {
    fn from(err: url::ParseError) -> Self {
        CheckoutError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for CheckoutError {
    fn from(err: std::io::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CheckoutError {
    fn from(err: toml::ser::Error) -> Self {
        CheckoutError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl CheckoutError {
    /// Returns true if the submission may succeed when sent again unchanged.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 5xx responses
    /// - 429 Too Many Requests
    ///
    /// ## Non-Retryable Errors
    /// - Every other 4xx (the cart itself is wrong)
    /// - Readiness and engine errors
    /// - Configuration errors
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::ConnectionFailed(_)
                | CheckoutError::Timeout(_)
                | CheckoutError::ServerError { .. }
        ) || matches!(self, CheckoutError::Rejected { status, .. } if *status == 429)
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::InvalidConfig(_)
                | CheckoutError::InvalidUrl(_)
                | CheckoutError::ConfigLoadFailed(_)
                | CheckoutError::ConfigSaveFailed(_)
                | CheckoutError::CatalogLoadFailed { .. }
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
