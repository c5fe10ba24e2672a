//! # Cart Payload Builder
//!
//! Flattens the selection store into the line items the commerce backend's
//! "add to cart" endpoint expects.
//!
//! ## Flattening
//! ```text
//! Store                                    Payload
//! ─────────────────────────────────        ──────────────────────────────
//! ("case", Primary)     Black      ×1  ─┐
//! ("keycaps", Primary)  Ocean      ×1   ├─► { id: Black,  quantity: 1 }
//! ("keycaps", Additional)                ├─► { id: Ocean,  quantity: 3 }
//!                       Ocean      ×2  ─┤   { id: Sunset, quantity: 1 }
//!                       Sunset     ×1  ─┘
//!
//! One line per distinct variant id, quantities summed, in the order ids
//! were first met while walking the store.
//! ```
//!
//! When the catalog enables line-item properties, every line also carries the
//! bundle metadata the storefront uses to group the configuration in the cart.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::selection::SelectionStore;
use crate::types::VariantId;
use crate::validation::validate_bundle_id;

/// Separator for the `_Layer Images` property.
const LAYER_IMAGE_SEPARATOR: &str = "|";

// =============================================================================
// Payload Types
// =============================================================================

/// One line of the cart submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    pub id: VariantId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

/// Body of the "add to cart" request: `{ "items": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartPayload {
    pub items: Vec<CartLineItem>,
}

impl CartPayload {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

// =============================================================================
// Building
// =============================================================================

/// Preview layers: images of selected required components, by layer index.
///
/// A variant without its own featured image falls back to the component's.
pub fn layer_images(catalog: &Catalog, store: &SelectionStore) -> Vec<String> {
    let mut required: Vec<_> = catalog.components().iter().filter(|c| c.required).collect();
    required.sort_by_key(|c| c.layer_index);

    required
        .into_iter()
        .filter_map(|component| {
            let selected = store.primary(&component.handle)?;
            selected
                .featured_image
                .clone()
                .or_else(|| component.featured_image.clone())
        })
        .collect()
}

/// Builds the submission payload.
///
/// ## Errors
/// - `EmptyConfiguration` when nothing is selected
/// - `UnavailableVariant` for the first sold-out variant met; nothing is built
/// - `Validation` when `bundle_id` is blank
/// - `UnknownComponent` when the store holds a handle the catalog lacks
pub fn build_cart_payload(
    catalog: &Catalog,
    store: &SelectionStore,
    bundle_id: &str,
) -> CoreResult<CartPayload> {
    if store.is_empty() {
        return Err(CoreError::EmptyConfiguration);
    }
    validate_bundle_id(bundle_id)?;

    let with_properties = catalog.add_line_item_properties();
    let joined_layers = if with_properties {
        layer_images(catalog, store).join(LAYER_IMAGE_SEPARATOR)
    } else {
        String::new()
    };

    let mut lines: IndexMap<VariantId, CartLineItem> = IndexMap::new();

    for (key, variant) in store.all_variants() {
        let component = catalog.require_component(&key.handle)?;

        if !variant.available {
            return Err(CoreError::UnavailableVariant {
                component: component.handle.clone(),
                variant_id: variant.id,
                title: variant.title.clone(),
            });
        }

        let line = lines.entry(variant.id).or_insert_with(|| CartLineItem {
            id: variant.id,
            quantity: 0,
            properties: None,
        });
        line.quantity = line.quantity.saturating_add(variant.quantity.max(1));

        if with_properties {
            let layer_image = store
                .primary(&component.handle)
                .and_then(|v| v.featured_image.clone())
                .or_else(|| component.featured_image.clone())
                .unwrap_or_default();

            let mut properties = BTreeMap::new();
            properties.insert("_Bundle Type".to_string(), catalog.bundle_type().to_string());
            properties.insert("_Bundle ID".to_string(), bundle_id.to_string());
            properties.insert(
                "_Parent Product".to_string(),
                catalog.parent_product_title().to_string(),
            );
            properties.insert(
                "_Component Type".to_string(),
                catalog.component_type(component),
            );
            properties.insert("_Layer Image".to_string(), layer_image);
            properties.insert(
                "_Layer Index".to_string(),
                component.layer_index.to_string(),
            );
            properties.insert("_Layer Images".to_string(), joined_layers.clone());

            for (option, value) in component.options.iter().zip(&variant.option_values) {
                properties.insert(
                    format!("_option_{}", option.name.to_lowercase()),
                    value.clone(),
                );
            }

            // The last grouping that mentions a variant decides its properties.
            line.properties = Some(properties);
        }
    }

    Ok(CartPayload {
        items: lines.into_values().collect(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
