//! # Domain Types
//!
//! Catalog types used throughout the configurator.
//!
//! ## Two Shapes of the Same Data
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  WIRE (serde, as shipped by the storefront)    MODEL (after load)       │
//! │  ───────────────────────────────────────       ──────────────────────   │
//! │  CatalogDocument                        ──►    Catalog                  │
//! │  ComponentData                          ──►    Component                │
//! │  VariantData { title: "Black / Hot" }   ──►    Variant {                │
//! │                                                  option_values:         │
//! │                                                    ["Black", "Hot"] }   │
//! │  ConflictRule                           ──►    ConflictRule (as is)     │
//! │                                                                         │
//! │  The " / "-joined title is split ONCE, at load. Nothing downstream     │
//! │  re-derives option values from a formatted string.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::money::Money;

/// Variant identifier as issued by the commerce backend.
pub type VariantId = u64;

// =============================================================================
// Wire Types
// =============================================================================

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_true() -> bool {
    true
}

/// The catalog document loaded once at startup.
///
/// Keys are accepted in snake_case and in the camelCase used by some
/// storefront templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Name of the assembled product ("Nova 75"); stripped from component titles.
    #[serde(default, alias = "parentProductTitle")]
    pub parent_product_title: String,

    pub components: Vec<ComponentData>,

    #[serde(default)]
    pub conflicts: Vec<ConflictRule>,

    #[serde(default = "default_currency_symbol", alias = "currencySymbol")]
    pub currency_symbol: String,

    /// Attach bundle metadata to each cart line item.
    #[serde(default, alias = "addLineItemProperties")]
    pub add_line_item_properties: bool,

    #[serde(default, alias = "bundleType")]
    pub bundle_type: Option<String>,
}

/// A component as it appears in the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentData {
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<OptionData>,
    #[serde(default)]
    pub variants: Vec<VariantData>,
    #[serde(default, alias = "layerIndex")]
    pub layer_index: i64,
    #[serde(default, alias = "blueprint_image", alias = "blueprintImage")]
    pub blueprint: Option<String>,
    #[serde(default, alias = "featuredImage")]
    pub featured_image: Option<String>,
    #[serde(default, alias = "clarifyingText")]
    pub clarifying_text: Option<String>,
}

/// A named option axis ("Color", "Mounting").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionData {
    pub name: String,
}

/// A variant as it appears in the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantData {
    pub id: VariantId,
    pub title: String,
    pub price: Money,
    #[serde(default = "default_true")]
    pub available: bool,
    /// Explicit option values; when absent they are parsed from `title`.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default, alias = "featuredImage")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

// =============================================================================
// Conflict Rule
// =============================================================================

/// Declares specific variants of two components incompatible.
///
/// ## Reading a Rule
/// ```text
/// { component1: "plate", component1_variants: [ISO],
///   component2: "pcb",   component2_variants: [HOTSWAP] }
///
/// An ISO plate is in conflict unless the PCB selections include
/// something other than HOTSWAP, and a HOTSWAP PCB is in conflict
/// unless the plate selections include something other than ISO.
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    pub component1: String,
    #[serde(deserialize_with = "deserialize_variant_ids")]
    pub component1_variants: Vec<VariantId>,
    pub component2: String,
    #[serde(deserialize_with = "deserialize_variant_ids")]
    pub component2_variants: Vec<VariantId>,
    #[serde(default)]
    pub disclaimer: String,
}

impl ConflictRule {
    /// Conflict ids for one side of the rule, if `handle` is part of it.
    pub fn variants_for(&self, handle: &str) -> Option<&[VariantId]> {
        if self.component1 == handle {
            Some(&self.component1_variants)
        } else if self.component2 == handle {
            Some(&self.component2_variants)
        } else {
            None
        }
    }
}

/// Storefront metafields deliver ids as numbers or as numeric strings.
fn deserialize_variant_ids<'de, D>(deserializer: D) -> Result<Vec<VariantId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Number(VariantId),
        Text(String),
    }

    let raw = Vec::<IdRepr>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|id| match id {
            IdRepr::Number(n) => Ok(n),
            IdRepr::Text(s) => s.trim().parse::<VariantId>().map_err(|_| {
                serde::de::Error::custom(format!("variant id '{}' is not a number", s))
            }),
        })
        .collect()
}

// =============================================================================
// Model Types
// =============================================================================

/// A named option axis with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentOption {
    pub name: String,
    pub position: usize,
}

/// One concrete, priced combination of a component's option values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub id: VariantId,
    /// Display title, e.g. "Black / Hotswap".
    pub title: String,
    /// Option values in `Component::options` order, parsed at load.
    pub option_values: Vec<String>,
    pub price: Money,
    pub available: bool,
    pub featured_image: Option<String>,
    pub images: Vec<String>,
}

impl Variant {
    /// Value chosen at a 1-based option position.
    #[inline]
    pub fn option_value(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|idx| self.option_values.get(idx))
            .map(String::as_str)
    }

    #[inline]
    pub fn is_sold_out(&self) -> bool {
        !self.available
    }
}

/// A configurable part of the product (case, PCB, plate, keycaps...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Unique handle, e.g. "case".
    pub handle: String,
    pub title: String,
    /// Required components must hold a primary selection before checkout.
    pub required: bool,
    pub options: Vec<ComponentOption>,
    pub variants: Vec<Variant>,
    /// Stacking order of the preview layers (lower is drawn first).
    pub layer_index: i64,
    pub blueprint_image: Option<String>,
    pub featured_image: Option<String>,
    pub clarifying_text: Option<String>,
}

impl Component {
    /// Looks up a variant by id.
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Number of option positions.
    #[inline]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Option by 1-based position.
    pub fn option_at(&self, position: usize) -> Option<&ComponentOption> {
        position.checked_sub(1).and_then(|idx| self.options.get(idx))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_ids_accept_numbers_and_strings() {
        let rule: ConflictRule = serde_json::from_str(
            r#"{
                "component1": "plate",
                "component1_variants": [101, "102"],
                "component2": "pcb",
                "component2_variants": [" 201 "],
                "disclaimer": "ISO plates do not fit hotswap PCBs"
            }"#,
        )
        .unwrap();

        assert_eq!(rule.component1_variants, vec![101, 102]);
        assert_eq!(rule.component2_variants, vec![201]);
        assert_eq!(rule.variants_for("pcb"), Some(&[201][..]));
        assert_eq!(rule.variants_for("case"), None);
    }

    #[test]
    fn test_conflict_ids_reject_garbage() {
        let result: Result<ConflictRule, _> = serde_json::from_str(
            r#"{"component1": "a", "component1_variants": ["x1"],
                "component2": "b", "component2_variants": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_document_accepts_camel_case_keys() {
        let doc: CatalogDocument = serde_json::from_str(
            r#"{
                "parentProductTitle": "Nova 75",
                "currencySymbol": "€",
                "addLineItemProperties": true,
                "components": [{
                    "handle": "case", "title": "Nova 75 Case",
                    "layerIndex": 2, "featuredImage": "case.png",
                    "variants": [{ "id": 1, "title": "Black", "price": 100 }]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.parent_product_title, "Nova 75");
        assert_eq!(doc.currency_symbol, "€");
        assert!(doc.add_line_item_properties);
        assert_eq!(doc.components[0].layer_index, 2);
        assert!(!doc.components[0].required);
        assert!(doc.components[0].variants[0].available);
    }

    #[test]
    fn test_document_defaults() {
        let doc: CatalogDocument = serde_json::from_str(r#"{"components": []}"#).unwrap();
        assert_eq!(doc.currency_symbol, "$");
        assert!(doc.conflicts.is_empty());
        assert!(!doc.add_line_item_properties);
    }

    #[test]
    fn test_variant_option_positions_are_one_based() {
        let variant = Variant {
            id: 1,
            title: "Black / Hotswap".into(),
            option_values: vec!["Black".into(), "Hotswap".into()],
            price: Money::from_minor(100),
            available: true,
            featured_image: None,
            images: Vec::new(),
        };
        assert_eq!(variant.option_value(0), None);
        assert_eq!(variant.option_value(1), Some("Black"));
        assert_eq!(variant.option_value(2), Some("Hotswap"));
        assert_eq!(variant.option_value(3), None);
    }
}
