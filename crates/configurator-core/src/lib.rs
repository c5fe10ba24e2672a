//! # configurator-core: Configuration Resolution & Conflict Engine
//!
//! This crate is the **heart** of the configurator. A buyer assembles a
//! multi-part product (a custom keyboard, say) from a catalog of components;
//! this crate turns their option choices into priced variants, keeps track of
//! what is selected, flags incompatible pairings and decides whether the
//! configuration may go to checkout. All of it as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Configurator Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Rendering layer (any UI technology)               │   │
//! │  │    Cards ──► Dropdowns ──► Summary ──► Add to Cart button       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands / snapshots                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ configurator-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │  catalog ─► resolver ─► selection ─► conflict + pricing         │   │
//! │  │                                          │                      │   │
//! │  │                                          ▼                      │   │
//! │  │                               snapshot / cart payload           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO LOGGING • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          configurator-checkout (commerce backend client)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog document and catalog model types
//! - [`catalog`] - Loading, integrity checks, title formatting, navigation
//! - [`resolver`] - Option position resolution and variant matching
//! - [`selection`] - The selection store (primary and additional selections)
//! - [`conflict`] - Pairwise incompatibility evaluation
//! - [`pricing`] - Totals and checkout readiness
//! - [`payload`] - Cart line-item payload for the commerce backend
//! - [`engine`] - The [`Configurator`] facade tying everything together
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use configurator_core::{Catalog, Configurator, ReadinessPolicy, SelectionKind};
//!
//! let catalog = Catalog::from_json(r#"{
//!     "components": [{
//!         "handle": "case", "title": "Case", "required": true,
//!         "options": [{ "name": "Color" }],
//!         "variants": [{ "id": 1, "title": "Black", "price": 10000, "available": true }]
//!     }]
//! }"#).unwrap();
//!
//! let mut configurator = Configurator::new(catalog, ReadinessPolicy::default());
//! let snapshot = configurator.select("case", 1, SelectionKind::Primary, 1).unwrap();
//!
//! assert!(snapshot.can_checkout);
//! assert_eq!(snapshot.formatted_total, "$100.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod money;
pub mod payload;
pub mod pricing;
pub mod resolver;
pub mod selection;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{handleize, Catalog, CatalogIssue, Direction};
pub use conflict::{ConflictRecord, ConflictReport, ConflictSuggestion};
pub use engine::{
    ChoiceOutcome, ConfigurationSnapshot, Configurator, Focus, SelectedLineView, SelectionView,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payload::{CartLineItem, CartPayload};
pub use pricing::{CheckoutStatus, ReadinessPolicy, ReadinessReport, ReadinessWarning};
pub use resolver::{PositionChoice, PositionOptions, VariantResolver};
pub use selection::{SelectedVariant, SelectionEntry, SelectionKey, SelectionKind, SelectionStore};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Separator between option values in a variant title ("Black / Hotswap").
pub const OPTION_SEPARATOR: &str = " / ";

/// Suffix appended to option labels when every matching variant is sold out.
pub const SOLD_OUT_SUFFIX: &str = " - SOLD OUT";

/// Maximum quantity of a single additional line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum number of distinct lines under one additional selection.
pub const MAX_ADDITIONAL_LINES: usize = 100;

/// Bundle type written to line-item properties when the catalog does not name one.
pub const DEFAULT_BUNDLE_TYPE: &str = "keyboard_config";
