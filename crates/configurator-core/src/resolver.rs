//! # Variant Resolver
//!
//! Maps per-position option choices of one component to concrete variants.
//!
//! ## Dropdown Cascade
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PCB  (options: Layout, Mounting)                                       │
//! │                                                                         │
//! │  variants:  ANSI / Hotswap  $50     ISO / Hotswap  $55 (sold out)       │
//! │             ANSI / Solder   $45     ISO / Solder   $50                  │
//! │                                                                         │
//! │  Position 1 (Layout), no prior filter:                                  │
//! │     "ANSI - $45.00 - $50.00"                                            │
//! │     "ISO - $50.00 - $55.00"                                             │
//! │           │ user picks ISO                                              │
//! │           ▼                                                             │
//! │  Position 2 (Mounting), prior {1: "ISO"}:                               │
//! │     "Hotswap - $55.00 - SOLD OUT"                                       │
//! │     "Solder - $50.00"                                                   │
//! │           │ user picks Solder                                           │
//! │           ▼                                                             │
//! │  matching_variant(["ISO", "Solder"]) ─► Some(ISO / Solder)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Choices keep the order in which their values first appear in the variant
//! list. They are deliberately not sorted: the catalog author controls order.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use ts_rs::TS;

use crate::catalog::handleize;
use crate::money::Money;
use crate::types::{Component, Variant};
use crate::SOLD_OUT_SUFFIX;

/// Separator between a value and its price decorations in a label.
const LABEL_SEPARATOR: &str = " - ";

// =============================================================================
// Result Types
// =============================================================================

/// One legal value for an option position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PositionChoice {
    /// Raw option value, e.g. "Hotswap".
    pub value: String,
    pub min_price: Money,
    pub max_price: Money,
    /// Every variant carrying this value (given the prior choices) is unavailable.
    pub sold_out: bool,
    /// Decorated label, e.g. "Hotswap - $50.00 - $55.00 - SOLD OUT".
    pub label: String,
}

/// The legal choices for one option position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PositionOptions {
    pub position: usize,
    /// Handleized option name, e.g. "switch-type"; empty when out of range.
    pub option_key: String,
    pub choices: Vec<PositionChoice>,
    /// Set when exactly one value is legal; the caller should select it.
    pub auto_select: Option<String>,
}

impl PositionOptions {
    fn empty(position: usize, option_key: &str) -> Self {
        PositionOptions {
            position,
            option_key: option_key.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// The value to auto-select, unless the caller already holds it.
    ///
    /// Applying the signal twice is a no-op the second time.
    pub fn auto_advance(&self, current: Option<&str>) -> Option<&str> {
        match (&self.auto_select, current) {
            (Some(only), Some(held)) if raw_option_value(held) == only => None,
            (Some(only), _) => Some(only.as_str()),
            (None, _) => None,
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves option choices for a single component.
#[derive(Debug, Clone, Copy)]
pub struct VariantResolver<'a> {
    component: &'a Component,
    currency_symbol: &'a str,
}

impl<'a> VariantResolver<'a> {
    pub fn new(component: &'a Component, currency_symbol: &'a str) -> Self {
        VariantResolver {
            component,
            currency_symbol,
        }
    }

    pub fn component(&self) -> &'a Component {
        self.component
    }

    /// Legal values for a 1-based `position`, given the choices at earlier positions.
    ///
    /// Returns an empty result when the position is out of range or any
    /// earlier position has no choice yet. Prior values may be decorated
    /// labels; the decorations are stripped and the rest is compared exactly,
    /// whitespace and case included.
    pub fn options_for_position(
        &self,
        position: usize,
        prior: &BTreeMap<usize, String>,
    ) -> PositionOptions {
        let Some(option) = self.component.option_at(position) else {
            return PositionOptions::empty(position, "");
        };
        let option_key = handleize(&option.name);

        let mut filters = Vec::with_capacity(position - 1);
        for earlier in 1..position {
            match prior.get(&earlier) {
                Some(value) if !value.trim().is_empty() => {
                    filters.push((earlier, strip_decorations(value)))
                }
                _ => return PositionOptions::empty(position, &option_key),
            }
        }

        let survivors = self.component.variants.iter().filter(|variant| {
            filters
                .iter()
                .all(|(pos, value)| variant.option_value(*pos) == Some(*value))
        });

        // value -> (min, max, all_sold_out), kept in first-seen order
        let mut order: Vec<&str> = Vec::new();
        let mut stats: HashMap<&str, (Money, Money, bool)> = HashMap::new();

        for variant in survivors {
            let Some(value) = variant.option_value(position) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            stats
                .entry(value)
                .and_modify(|(min, max, all_sold_out)| {
                    *min = (*min).min(variant.price);
                    *max = (*max).max(variant.price);
                    *all_sold_out &= variant.is_sold_out();
                })
                .or_insert_with(|| {
                    order.push(value);
                    (variant.price, variant.price, variant.is_sold_out())
                });
        }

        let choices: Vec<PositionChoice> = order
            .into_iter()
            .filter_map(|value| {
                stats.get(value).map(|&(min_price, max_price, sold_out)| PositionChoice {
                    value: value.to_string(),
                    min_price,
                    max_price,
                    sold_out,
                    label: self.label(value, min_price, max_price, sold_out),
                })
            })
            .collect();

        let auto_select = match choices.as_slice() {
            [only] => Some(only.value.clone()),
            _ => None,
        };

        PositionOptions {
            position,
            option_key,
            choices,
            auto_select,
        }
    }

    fn label(&self, value: &str, min: Money, max: Money, sold_out: bool) -> String {
        let mut label = format!("{}{}{}", value, LABEL_SEPARATOR, min.format(self.currency_symbol));
        if min != max {
            label.push_str(LABEL_SEPARATOR);
            label.push_str(&max.format(self.currency_symbol));
        }
        if sold_out {
            label.push_str(SOLD_OUT_SUFFIX);
        }
        label
    }

    /// The variant whose option values equal `selected`, position by position.
    ///
    /// Comparison is trimmed and case-insensitive; decorated labels are
    /// accepted. A different number of values never matches. A component
    /// without options matches an empty selection.
    pub fn matching_variant<S: AsRef<str>>(&self, selected: &[S]) -> Option<&'a Variant> {
        let wanted: Vec<String> = selected
            .iter()
            .map(|s| normalize(raw_option_value(s.as_ref())))
            .collect();

        self.component.variants.iter().find(|variant| {
            variant.option_values.len() == wanted.len()
                && variant
                    .option_values
                    .iter()
                    .zip(&wanted)
                    .all(|(have, want)| normalize(raw_option_value(have)) == *want)
        })
    }

    /// True iff `selected` resolves to a variant.
    pub fn is_valid_variant<S: AsRef<str>>(&self, selected: &[S]) -> bool {
        self.matching_variant(selected).is_some()
    }
}

// =============================================================================
// Label Helpers
// =============================================================================

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Reduces a decorated label to its raw option value.
///
/// ## Example
/// ```rust
/// use configurator_core::resolver::raw_option_value;
///
/// assert_eq!(raw_option_value("Hotswap - $50.00 - $55.00 - SOLD OUT"), "Hotswap");
/// assert_eq!(raw_option_value("Hotswap - $50.00"), "Hotswap");
/// assert_eq!(raw_option_value("Black - Anodized"), "Black - Anodized");
/// ```
pub fn raw_option_value(label: &str) -> &str {
    strip_decorations(label.trim_end()).trim()
}

/// Drops a trailing "SOLD OUT" and up to two price segments, nothing else.
fn strip_decorations(label: &str) -> &str {
    let mut value = label;

    let lower = value.to_ascii_lowercase();
    if lower.ends_with(&SOLD_OUT_SUFFIX.to_ascii_lowercase()) {
        value = &value[..value.len() - SOLD_OUT_SUFFIX.len()];
    }

    // At most two price segments: "- $min" and "- $max".
    for _ in 0..2 {
        match value.rsplit_once(LABEL_SEPARATOR) {
            Some((head, tail)) if looks_like_price(tail) => value = head,
            _ => break,
        }
    }

    value
}

/// A currency symbol of one to four characters followed by an amount with two decimals.
fn looks_like_price(segment: &str) -> bool {
    let segment = segment.trim();
    let digits_start = match segment.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => idx,
        None => return false,
    };
    let (symbol, amount) = segment.split_at(digits_start);
    let symbol_len = symbol.chars().count();

    let Some((whole, cents)) = amount.rsplit_once('.') else {
        return false;
    };

    (1..=4).contains(&symbol_len)
        && !symbol.chars().any(char::is_whitespace)
        && whole.chars().all(|c| c.is_ascii_digit() || c == ',')
        && cents.len() == 2
        && cents.chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pcb_matrix_catalog, scenario_catalog};

    fn prior(values: &[(usize, &str)]) -> BTreeMap<usize, String> {
        values.iter().map(|(p, v)| (*p, v.to_string())).collect()
    }

    #[test]
    fn test_first_position_lists_ranges_in_first_seen_order() {
        let catalog = pcb_matrix_catalog();
        let pcb = catalog.component("pcb").unwrap();
        let resolver = VariantResolver::new(pcb, "$");

        let options = resolver.options_for_position(1, &BTreeMap::new());
        let labels: Vec<&str> = options.choices.iter().map(|c| c.label.as_str()).collect();

        assert_eq!(
            labels,
            vec!["ANSI - $45.00 - $50.00", "ISO - $50.00 - $55.00"]
        );
        assert_eq!(options.auto_select, None);
    }

    #[test]
    fn test_later_position_filters_on_prior_choices() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        // Decorated prior labels are reduced to raw values first.
        let options = resolver.options_for_position(2, &prior(&[(1, "ISO - $50.00 - $55.00")]));

        assert_eq!(options.choices.len(), 2);
        assert_eq!(options.choices[0].value, "Hotswap");
        assert!(options.choices[0].sold_out);
        assert_eq!(options.choices[0].label, "Hotswap - $55.00 - SOLD OUT");
        assert_eq!(options.choices[1].label, "Solder - $50.00");
    }

    #[test]
    fn test_prior_filter_is_case_sensitive() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        let options = resolver.options_for_position(2, &prior(&[(1, "iso")]));
        assert!(options.is_empty());
    }

    #[test]
    fn test_prior_filter_is_whitespace_sensitive() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        assert!(resolver
            .options_for_position(2, &prior(&[(1, " ISO")]))
            .is_empty());
        assert!(resolver
            .options_for_position(2, &prior(&[(1, "ISO ")]))
            .is_empty());
        assert_eq!(
            resolver
                .options_for_position(2, &prior(&[(1, "ISO - $50.00 - $55.00 - SOLD OUT")]))
                .choices
                .len(),
            2
        );
    }

    #[test]
    fn test_options_carry_handleized_option_key() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        assert_eq!(resolver.options_for_position(1, &BTreeMap::new()).option_key, "layout");
        // Still keyed when the prior choice is missing.
        assert_eq!(resolver.options_for_position(2, &BTreeMap::new()).option_key, "mounting");
        assert_eq!(resolver.options_for_position(3, &BTreeMap::new()).option_key, "");
    }

    #[test]
    fn test_missing_prior_or_out_of_range_is_empty() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        assert!(resolver.options_for_position(2, &BTreeMap::new()).is_empty());
        assert!(resolver.options_for_position(0, &BTreeMap::new()).is_empty());
        assert!(resolver.options_for_position(3, &BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_single_choice_auto_advances_once() {
        let catalog = scenario_catalog();
        let resolver = VariantResolver::new(catalog.component("case").unwrap(), "$");

        let options = resolver.options_for_position(2, &prior(&[(1, "Aluminium")]));
        assert_eq!(options.auto_select.as_deref(), Some("Silver"));
        assert_eq!(options.auto_advance(None), Some("Silver"));
        assert_eq!(options.auto_advance(Some("Black")), Some("Silver"));
        assert_eq!(options.auto_advance(Some("Silver - $150.00 - SOLD OUT")), None);
    }

    #[test]
    fn test_matching_is_trimmed_and_case_insensitive() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        let variant = resolver.matching_variant(&[" iso ", "SOLDER"]).unwrap();
        assert_eq!(variant.title, "ISO / Solder");

        let decorated = resolver
            .matching_variant(&["ISO - $50.00 - $55.00", "Hotswap - $55.00 - SOLD OUT"])
            .unwrap();
        assert_eq!(decorated.title, "ISO / Hotswap");
    }

    #[test]
    fn test_arity_mismatch_never_matches() {
        let catalog = pcb_matrix_catalog();
        let resolver = VariantResolver::new(catalog.component("pcb").unwrap(), "$");

        assert!(!resolver.is_valid_variant(&["ISO"]));
        assert!(!resolver.is_valid_variant(&["ISO", "Solder", "Extra"]));
        assert!(!resolver.is_valid_variant(&["ISO", "Magnetic"]));
        assert!(resolver.is_valid_variant(&["ANSI", "Hotswap"]));
    }

    #[test]
    fn test_every_complete_tuple_matches_exactly_one_variant() {
        let catalog = pcb_matrix_catalog();
        let pcb = catalog.component("pcb").unwrap();
        let resolver = VariantResolver::new(pcb, "$");

        for variant in &pcb.variants {
            let matched = resolver
                .matching_variant(variant.option_values.as_slice())
                .unwrap();
            assert_eq!(matched.id, variant.id);
        }
    }

    #[test]
    fn test_zero_option_component_resolves_empty_selection() {
        let catalog = crate::Catalog::from_json(
            r#"{"components": [{"handle": "stickers", "title": "Stickers",
                "variants": [{"id": 5, "title": "Default Title", "price": 0}]}]}"#,
        )
        .unwrap();
        let resolver = VariantResolver::new(catalog.component("stickers").unwrap(), "$");

        let empty: [&str; 0] = [];
        assert_eq!(resolver.matching_variant(&empty).map(|v| v.id), Some(5));
    }

    #[test]
    fn test_raw_option_value_keeps_plain_dashes() {
        assert_eq!(raw_option_value("Hotswap - €50.00"), "Hotswap");
        assert_eq!(raw_option_value("Gasket - Mount"), "Gasket - Mount");
        assert_eq!(raw_option_value("Silver - SOLD OUT"), "Silver");
        assert_eq!(raw_option_value("Silver"), "Silver");
        assert_eq!(raw_option_value("Layout - v2"), "Layout - v2");
        assert_eq!(raw_option_value("Size - 75"), "Size - 75");
    }
}
