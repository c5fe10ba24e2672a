//! # configurator-checkout: Configuration & Cart Submission
//!
//! The I/O shell around `configurator-core`: it loads the settings file and
//! the catalog document from disk, and hands a finished configuration to the
//! commerce backend's "add to cart" endpoint.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart Submission                                │
//! │                                                                         │
//! │  Configurator (core)                                                   │
//! │       │ snapshot()                                                      │
//! │       ▼                                                                 │
//! │  checkout gate open? ── no ──► CheckoutError::NotReady { label }       │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  cart_payload() ── bundle id (uuid v4) + line items                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────┐   transient failure                  │
//! │  │ CommerceBackend::add_to_cart │◄──────────────────┐                  │
//! │  │ (HttpCommerceBackend: POST)  │                   │                  │
//! │  └──────────────┬───────────────┘── is_retryable ───┘ (exp. backoff)   │
//! │                 │ 2xx                                                   │
//! │                 ▼                                                       │
//! │  SubmissionReceipt { bundle_id, item_count, total_quantity, .. }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The configurator itself is only borrowed: a failed submission leaves the
//! selections exactly as they were.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod submit;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{CommerceBackend, HttpCommerceBackend};
pub use config::{
    load_catalog, BackendSettings, CatalogSettings, CheckoutSettings, ConfiguratorConfig,
    RetrySettings,
};
pub use error::{CheckoutError, CheckoutResult};
pub use submit::{submit_configuration, SubmissionReceipt};
