//! # Catalog Model
//!
//! The immutable, in-memory catalog: components, their options and variants,
//! and the conflict rules between them.
//!
//! ## Load Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog::from_json                              │
//! │                                                                         │
//! │  JSON text                                                              │
//! │     │  serde (snake_case or camelCase keys)                             │
//! │     ▼                                                                   │
//! │  CatalogDocument                                                        │
//! │     │                                                                   │
//! │     ├── structural checks ──► Err(CoreError)   catalog unusable         │
//! │     │     • no components                                               │
//! │     │     • empty / malformed / duplicate handle                        │
//! │     │     • negative price                                              │
//! │     │                                                                   │
//! │     ├── integrity checks  ──► Vec<CatalogIssue> catalog still usable    │
//! │     │     • rule names an unknown component or variant                  │
//! │     │     • variant option count ≠ component option count               │
//! │     │     • duplicate variant id (later one dropped)                    │
//! │     ▼                                                                   │
//! │  Catalog (read-only for the lifetime of the process)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Issues are returned, not logged: this crate has no logging. Callers report
//! them with `tracing::warn!` after loading.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::selection::SelectionKind;
use crate::types::{
    CatalogDocument, Component, ComponentData, ComponentOption, ConflictRule, Variant, VariantId,
};
use crate::validation::{validate_handle, validate_price};
use crate::{DEFAULT_BUNDLE_TYPE, OPTION_SEPARATOR};

// =============================================================================
// Catalog Issues
// =============================================================================

/// A non-fatal integrity problem found while loading a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogIssue {
    /// A conflict rule names a component that does not exist; the rule is skipped.
    UnknownRuleComponent { rule_index: usize, handle: String },

    /// A conflict rule lists a variant id the component does not have.
    UnknownRuleVariant {
        rule_index: usize,
        handle: String,
        variant_id: VariantId,
    },

    /// A variant's option values do not line up with the component's options.
    /// Such a variant can never be matched from dropdown choices.
    OptionArityMismatch {
        handle: String,
        variant_id: VariantId,
        expected: usize,
        found: usize,
    },

    /// Two variants of one component share an id; the later one was dropped.
    DuplicateVariantId { handle: String, variant_id: VariantId },

    /// A component has no variants at all.
    NoVariants { handle: String },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::UnknownRuleComponent { rule_index, handle } => write!(
                f,
                "conflict rule #{} references unknown component '{}'",
                rule_index, handle
            ),
            CatalogIssue::UnknownRuleVariant {
                rule_index,
                handle,
                variant_id,
            } => write!(
                f,
                "conflict rule #{} references unknown variant {} of '{}'",
                rule_index, variant_id, handle
            ),
            CatalogIssue::OptionArityMismatch {
                handle,
                variant_id,
                expected,
                found,
            } => write!(
                f,
                "variant {} of '{}' has {} option values, expected {}",
                variant_id, handle, found, expected
            ),
            CatalogIssue::DuplicateVariantId { handle, variant_id } => write!(
                f,
                "component '{}' lists variant {} more than once",
                handle, variant_id
            ),
            CatalogIssue::NoVariants { handle } => {
                write!(f, "component '{}' has no variants", handle)
            }
        }
    }
}

/// Navigation direction over the component list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

// =============================================================================
// Catalog
// =============================================================================

/// The loaded catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    parent_product_title: String,
    components: Vec<Component>,
    index: HashMap<String, usize>,
    conflicts: Vec<ConflictRule>,
    currency_symbol: String,
    add_line_item_properties: bool,
    bundle_type: String,
    issues: Vec<CatalogIssue>,
}

impl Catalog {
    /// Parses and loads a catalog document.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Loads an already deserialized document.
    pub fn from_document(document: CatalogDocument) -> CoreResult<Self> {
        if document.components.is_empty() {
            return Err(CoreError::InvalidCatalog(
                "catalog has no components".to_string(),
            ));
        }

        let mut issues = Vec::new();
        let mut components = Vec::with_capacity(document.components.len());
        let mut index = HashMap::with_capacity(document.components.len());

        for data in document.components {
            validate_handle(&data.handle)?;
            if index.contains_key(&data.handle) {
                return Err(ValidationError::Duplicate {
                    field: "component handle".to_string(),
                    value: data.handle,
                }
                .into());
            }

            let component = build_component(data, &mut issues)?;
            index.insert(component.handle.clone(), components.len());
            components.push(component);
        }

        let mut catalog = Catalog {
            parent_product_title: document.parent_product_title.trim().to_string(),
            components,
            index,
            conflicts: document.conflicts,
            currency_symbol: document.currency_symbol,
            add_line_item_properties: document.add_line_item_properties,
            bundle_type: document
                .bundle_type
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BUNDLE_TYPE.to_string()),
            issues,
        };

        let rule_issues = catalog.check_rules();
        catalog.issues.extend(rule_issues);
        Ok(catalog)
    }

    fn check_rules(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        for (rule_index, rule) in self.conflicts.iter().enumerate() {
            let sides = [
                (&rule.component1, &rule.component1_variants),
                (&rule.component2, &rule.component2_variants),
            ];
            for (handle, ids) in sides {
                match self.component(handle) {
                    None => issues.push(CatalogIssue::UnknownRuleComponent {
                        rule_index,
                        handle: handle.clone(),
                    }),
                    Some(component) => {
                        for &variant_id in ids {
                            if component.variant(variant_id).is_none() {
                                issues.push(CatalogIssue::UnknownRuleVariant {
                                    rule_index,
                                    handle: handle.clone(),
                                    variant_id,
                                });
                            }
                        }
                    }
                }
            }
        }

        issues
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Components in catalog order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, handle: &str) -> Option<&Component> {
        self.index.get(handle).map(|&idx| &self.components[idx])
    }

    /// Like [`Catalog::component`], but an unknown handle is an error.
    pub fn require_component(&self, handle: &str) -> CoreResult<&Component> {
        self.component(handle)
            .ok_or_else(|| CoreError::UnknownComponent(handle.to_string()))
    }

    /// Looks up a variant, failing on unknown handles or ids.
    pub fn require_variant(&self, handle: &str, variant_id: VariantId) -> CoreResult<&Variant> {
        self.require_component(handle)?
            .variant(variant_id)
            .ok_or_else(|| CoreError::UnknownVariant {
                handle: handle.to_string(),
                variant_id,
            })
    }

    pub fn conflicts(&self) -> &[ConflictRule] {
        &self.conflicts
    }

    pub fn issues(&self) -> &[CatalogIssue] {
        &self.issues
    }

    pub fn parent_product_title(&self) -> &str {
        &self.parent_product_title
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn add_line_item_properties(&self) -> bool {
        self.add_line_item_properties
    }

    pub fn bundle_type(&self) -> &str {
        &self.bundle_type
    }

    /// Number of required components.
    pub fn total_required(&self) -> usize {
        self.components.iter().filter(|c| c.required).count()
    }

    /// Formats an amount with the catalog's currency symbol.
    pub fn format_price(&self, amount: Money) -> String {
        amount.format(&self.currency_symbol)
    }

    // -------------------------------------------------------------------------
    // Presentation Helpers
    // -------------------------------------------------------------------------

    /// Display title for a component.
    ///
    /// ## Rules
    /// ```text
    /// parent product: "Nova 75"
    ///
    /// "Nova 75 Case"            ─► "Case"
    /// "nova 75 switch_films"    ─► "switch films"
    /// "PCB", Primary            ─► "PCB"
    /// "PCB", Additional, req.   ─► "Extra PCB"
    /// "Keycaps", Additional     ─► "Keycaps"      (optional component: no prefix)
    /// ```
    pub fn format_component_title(&self, component: &Component, kind: SelectionKind) -> String {
        let stripped = strip_first_case_insensitive(&component.title, &self.parent_product_title);
        let base = stripped.replace(['-', '_'], " ").trim().to_string();

        if kind == SelectionKind::Additional && component.required {
            format!("Extra {}", base)
        } else {
            base
        }
    }

    /// Component title for cart properties: the parent product title is
    /// removed (with a trailing " - " or space), separators are kept.
    ///
    /// "Nova 75 - Switch-Films" ─► "Switch-Films"
    pub fn component_type(&self, component: &Component) -> String {
        let parent = self.parent_product_title.as_str();
        if parent.is_empty() {
            return component.title.trim().to_string();
        }
        component
            .title
            .replacen(&format!("{} - ", parent), "", 1)
            .replacen(&format!("{} ", parent), "", 1)
            .replacen(parent, "", 1)
            .trim()
            .to_string()
    }

    /// The component after (or before) `current`, wrapping around.
    ///
    /// With no current component, `Next` yields the first and `Previous`
    /// the last.
    pub fn next_component(&self, current: Option<&str>, direction: Direction) -> &Component {
        let len = self.components.len();
        let next_idx = match (current.and_then(|h| self.index.get(h)), direction) {
            (Some(&idx), Direction::Next) => (idx + 1) % len,
            (Some(&idx), Direction::Previous) => (idx + len - 1) % len,
            (None, Direction::Next) => 0,
            (None, Direction::Previous) => len - 1,
        };
        &self.components[next_idx]
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_component(data: ComponentData, issues: &mut Vec<CatalogIssue>) -> CoreResult<Component> {
    let options: Vec<ComponentOption> = data
        .options
        .into_iter()
        .enumerate()
        .map(|(idx, opt)| ComponentOption {
            name: opt.name,
            position: idx + 1,
        })
        .collect();

    if data.variants.is_empty() {
        issues.push(CatalogIssue::NoVariants {
            handle: data.handle.clone(),
        });
    }

    let mut seen = HashSet::new();
    let mut variants = Vec::with_capacity(data.variants.len());

    for raw in data.variants {
        validate_price(raw.price).map_err(|e| {
            CoreError::InvalidCatalog(format!("variant {} of '{}': {}", raw.id, data.handle, e))
        })?;

        if !seen.insert(raw.id) {
            issues.push(CatalogIssue::DuplicateVariantId {
                handle: data.handle.clone(),
                variant_id: raw.id,
            });
            continue;
        }

        let option_values = match raw.options {
            Some(values) => values.into_iter().map(|v| v.trim().to_string()).collect(),
            None if options.is_empty() => Vec::new(),
            None => parse_variant_title(&raw.title),
        };

        if option_values.len() != options.len() {
            issues.push(CatalogIssue::OptionArityMismatch {
                handle: data.handle.clone(),
                variant_id: raw.id,
                expected: options.len(),
                found: option_values.len(),
            });
        }

        variants.push(Variant {
            id: raw.id,
            title: raw.title,
            option_values,
            price: raw.price,
            available: raw.available,
            featured_image: raw.featured_image,
            images: raw.images,
        });
    }

    Ok(Component {
        handle: data.handle,
        title: data.title,
        required: data.required,
        options,
        variants,
        layer_index: data.layer_index,
        blueprint_image: data.blueprint,
        featured_image: data.featured_image,
        clarifying_text: data.clarifying_text,
    })
}

/// Splits a " / "-joined variant title into trimmed option values.
pub fn parse_variant_title(title: &str) -> Vec<String> {
    if title.trim().is_empty() {
        return Vec::new();
    }
    title
        .split(OPTION_SEPARATOR)
        .map(|part| part.trim().to_string())
        .collect()
}

/// Lowercases and collapses every run of non-alphanumerics into one dash.
///
/// ## Example
/// ```rust
/// use configurator_core::catalog::handleize;
///
/// assert_eq!(handleize("Switch Type"), "switch-type");
/// assert_eq!(handleize("  Keycap (Profile) "), "keycap-profile");
/// ```
pub fn handleize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Removes the first case-insensitive occurrence of `needle`.
fn strip_first_case_insensitive(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }

    let lower_haystack = haystack.to_lowercase();
    let lower_needle = needle.to_lowercase();

    // Lowercasing can change byte lengths outside ASCII; only slice when it did not.
    if lower_haystack.len() != haystack.len() {
        return haystack.to_string();
    }

    match lower_haystack.find(&lower_needle) {
        Some(start) => {
            let end = start + lower_needle.len();
            format!("{}{}", &haystack[..start], &haystack[end..])
        }
        None => haystack.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scenario_catalog, SCENARIO_JSON};

    #[test]
    fn test_load_scenario() {
        let catalog = scenario_catalog();
        assert_eq!(catalog.components().len(), 2);
        assert_eq!(catalog.total_required(), 2);
        assert_eq!(catalog.conflicts().len(), 1);
        assert!(catalog.issues().is_empty());
        assert_eq!(catalog.bundle_type(), DEFAULT_BUNDLE_TYPE);
        assert_eq!(catalog.format_price(Money::from_minor(15000)), "$150.00");
    }

    #[test]
    fn test_option_values_parsed_once_at_load() {
        let catalog = Catalog::from_json(
            r#"{"components": [{
                "handle": "pcb", "title": "PCB",
                "options": [{"name": "Layout"}, {"name": "Mounting"}],
                "variants": [
                    {"id": 1, "title": "ANSI / Hotswap", "price": 5000},
                    {"id": 2, "title": "ISO Solder", "price": 5000, "options": ["ISO", "Solder"]}
                ]
            }]}"#,
        )
        .unwrap();

        let pcb = catalog.component("pcb").unwrap();
        assert_eq!(pcb.variants[0].option_values, vec!["ANSI", "Hotswap"]);
        assert_eq!(pcb.variants[1].option_values, vec!["ISO", "Solder"]);
        assert_eq!(pcb.option_at(2).unwrap().name, "Mounting");
    }

    #[test]
    fn test_zero_option_component_has_no_values() {
        let catalog = Catalog::from_json(
            r#"{"components": [{
                "handle": "stickers", "title": "Stickers",
                "variants": [{"id": 9, "title": "Default Title", "price": 0}]
            }]}"#,
        )
        .unwrap();

        assert!(catalog.component("stickers").unwrap().variants[0]
            .option_values
            .is_empty());
        assert!(catalog.issues().is_empty());
    }

    #[test]
    fn test_structural_errors() {
        let empty = Catalog::from_json(r#"{"components": []}"#);
        assert!(matches!(empty, Err(CoreError::InvalidCatalog(_))));

        let malformed = Catalog::from_json("{ components: ");
        assert!(matches!(malformed, Err(CoreError::CatalogParse(_))));

        let duplicate = Catalog::from_json(
            r#"{"components": [
                {"handle": "case", "title": "Case"},
                {"handle": "case", "title": "Case again"}
            ]}"#,
        );
        assert!(matches!(
            duplicate,
            Err(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));

        let blank = Catalog::from_json(r#"{"components": [{"handle": " ", "title": "?"}]}"#);
        assert!(matches!(
            blank,
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let negative = Catalog::from_json(
            r#"{"components": [{"handle": "case", "title": "Case",
                "variants": [{"id": 1, "title": "Black", "price": -1}]}]}"#,
        );
        assert!(matches!(negative, Err(CoreError::InvalidCatalog(_))));
    }

    #[test]
    fn test_integrity_issues_are_reported() {
        let catalog = Catalog::from_json(
            r#"{
                "components": [
                    {"handle": "plate", "title": "Plate",
                     "options": [{"name": "Layout"}, {"name": "Material"}],
                     "variants": [
                        {"id": 1, "title": "ISO", "price": 100},
                        {"id": 1, "title": "ISO / Brass", "price": 100}
                     ]},
                    {"handle": "empty", "title": "Empty"}
                ],
                "conflicts": [
                    {"component1": "plate", "component1_variants": [1, 7],
                     "component2": "ghost", "component2_variants": [2]}
                ]
            }"#,
        )
        .unwrap();

        let issues = catalog.issues();
        assert!(issues.contains(&CatalogIssue::OptionArityMismatch {
            handle: "plate".into(),
            variant_id: 1,
            expected: 2,
            found: 1,
        }));
        assert!(issues.contains(&CatalogIssue::DuplicateVariantId {
            handle: "plate".into(),
            variant_id: 1,
        }));
        assert!(issues.contains(&CatalogIssue::NoVariants {
            handle: "empty".into()
        }));
        assert!(issues.contains(&CatalogIssue::UnknownRuleVariant {
            rule_index: 0,
            handle: "plate".into(),
            variant_id: 7,
        }));
        assert!(issues.contains(&CatalogIssue::UnknownRuleComponent {
            rule_index: 0,
            handle: "ghost".into(),
        }));
        assert_eq!(catalog.component("plate").unwrap().variants.len(), 1);
    }

    #[test]
    fn test_require_lookups() {
        let catalog = Catalog::from_json(SCENARIO_JSON).unwrap();
        assert!(catalog.require_variant("case", 1).is_ok());
        assert!(matches!(
            catalog.require_component("plate"),
            Err(CoreError::UnknownComponent(_))
        ));
        assert!(matches!(
            catalog.require_variant("case", 99),
            Err(CoreError::UnknownVariant { variant_id: 99, .. })
        ));
    }

    #[test]
    fn test_format_component_title() {
        let catalog = Catalog::from_json(
            r#"{
                "parent_product_title": "Nova 75",
                "components": [
                    {"handle": "case", "title": "Nova 75 Case", "required": true},
                    {"handle": "switch_films", "title": "nova 75 switch_films"}
                ]
            }"#,
        )
        .unwrap();

        let case = catalog.component("case").unwrap();
        let films = catalog.component("switch_films").unwrap();

        assert_eq!(
            catalog.format_component_title(case, SelectionKind::Primary),
            "Case"
        );
        assert_eq!(
            catalog.format_component_title(case, SelectionKind::Additional),
            "Extra Case"
        );
        assert_eq!(
            catalog.format_component_title(films, SelectionKind::Additional),
            "switch films"
        );
    }

    #[test]
    fn test_navigation_wraps_around() {
        let catalog = scenario_catalog();

        assert_eq!(catalog.next_component(None, Direction::Next).handle, "case");
        assert_eq!(
            catalog.next_component(None, Direction::Previous).handle,
            "pcb"
        );
        assert_eq!(
            catalog.next_component(Some("case"), Direction::Next).handle,
            "pcb"
        );
        assert_eq!(
            catalog.next_component(Some("pcb"), Direction::Next).handle,
            "case"
        );
        assert_eq!(
            catalog
                .next_component(Some("case"), Direction::Previous)
                .handle,
            "pcb"
        );
    }

    #[test]
    fn test_component_type_strips_parent_title_only() {
        let catalog = Catalog::from_json(
            r#"{
                "parent_product_title": "Nova 75",
                "components": [
                    {"handle": "films", "title": "Nova 75 - Switch-Films"},
                    {"handle": "case", "title": "Nova 75 Case_Top"},
                    {"handle": "foam", "title": "PE Foam"}
                ]
            }"#,
        )
        .unwrap();

        let title = |handle| catalog.component_type(catalog.component(handle).unwrap());
        assert_eq!(title("films"), "Switch-Films");
        assert_eq!(title("case"), "Case_Top");
        assert_eq!(title("foam"), "PE Foam");
    }

    #[test]
    fn test_handleize() {
        assert_eq!(handleize("Color"), "color");
        assert_eq!(handleize("Switch Type"), "switch-type");
        assert_eq!(handleize("--Plate / Material--"), "plate-material");
        assert_eq!(handleize(""), "");
    }

    #[test]
    fn test_issue_display() {
        let issue = CatalogIssue::UnknownRuleComponent {
            rule_index: 3,
            handle: "ghost".into(),
        };
        assert_eq!(
            issue.to_string(),
            "conflict rule #3 references unknown component 'ghost'"
        );
    }
}
