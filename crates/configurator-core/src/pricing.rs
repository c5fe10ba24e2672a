//! # Pricing & Readiness
//!
//! Running totals and the gate in front of "Add to Cart".
//!
//! ## Checkout Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  First matching row decides the button                                  │
//! │                                                                         │
//! │  nothing selected                   → "No Components Selected"    ✗     │
//! │  any selected variant sold out      → "Contains Sold Out Components" ✗  │
//! │  preorder required, not accepted    → "Please Accept Preorder          │
//! │                                         Agreement"                ✗     │
//! │  required components missing        → "1 / 2 Components Selected" ✗     │
//! │  conflict AND block_on_conflict     → "Resolve Component Conflicts" ✗   │
//! │  otherwise                          → "Add to Cart"               ✓     │
//! │                                                                         │
//! │  Conflicts do not block by default: they surface as a warning next to  │
//! │  an enabled button and the buyer decides.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::conflict::ConflictReport;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::selection::SelectionStore;

// =============================================================================
// Policy
// =============================================================================

/// Switches for the checkout gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessPolicy {
    /// Active conflicts disable checkout instead of only warning.
    #[serde(default)]
    pub block_on_conflict: bool,

    /// The buyer must accept the preorder agreement before checkout.
    #[serde(default)]
    pub require_preorder_agreement: bool,
}

// =============================================================================
// Status
// =============================================================================

/// What the checkout button should say, and whether it is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum CheckoutStatus {
    NoComponentsSelected,
    SoldOut,
    PreorderAgreementRequired,
    Incomplete { completed: usize, total: usize },
    ConflictsBlocking,
    Ready,
}

impl CheckoutStatus {
    pub fn label(&self) -> String {
        match self {
            CheckoutStatus::NoComponentsSelected => "No Components Selected".to_string(),
            CheckoutStatus::SoldOut => "Contains Sold Out Components".to_string(),
            CheckoutStatus::PreorderAgreementRequired => {
                "Please Accept Preorder Agreement".to_string()
            }
            CheckoutStatus::Incomplete { completed, total } => {
                format!("{} / {} Components Selected", completed, total)
            }
            CheckoutStatus::ConflictsBlocking => "Resolve Component Conflicts".to_string(),
            CheckoutStatus::Ready => "Add to Cart".to_string(),
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, CheckoutStatus::Ready)
    }
}

/// Non-blocking problems shown next to an enabled button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ReadinessWarning {
    Conflict,
    IncompleteBuild,
}

// =============================================================================
// Report
// =============================================================================

/// Totals and readiness flags for the current selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReadinessReport {
    pub total_price: Money,
    pub formatted_total: String,
    pub completed_required: usize,
    pub total_required: usize,
    pub has_sold_out: bool,
    pub missing_required: bool,
    pub has_active_conflict: bool,
    pub can_checkout: bool,
    pub status: CheckoutStatus,
    pub label: String,
    pub warnings: Vec<ReadinessWarning>,
}

/// Σ price × quantity over every selected line, in minor units.
pub fn total_price(store: &SelectionStore) -> CoreResult<Money> {
    store
        .all_variants()
        .try_fold(Money::zero(), |acc, (_, variant)| {
            variant.line_total().and_then(|line| acc.checked_add(line))
        })
        .ok_or(CoreError::PriceOverflow)
}

/// Any selected variant (primary or additional) is unavailable.
pub fn has_sold_out(store: &SelectionStore) -> bool {
    store.all_variants().any(|(_, v)| !v.available)
}

/// Computes totals and the checkout gate.
pub fn assess(
    catalog: &Catalog,
    store: &SelectionStore,
    conflicts: &ConflictReport,
    policy: ReadinessPolicy,
    preorder_accepted: bool,
) -> CoreResult<ReadinessReport> {
    let total = total_price(store)?;
    let completed_required = store.completed_required_count(catalog.components());
    let total_required = catalog.total_required();
    let sold_out = has_sold_out(store);

    let status = if store.is_empty() {
        CheckoutStatus::NoComponentsSelected
    } else if sold_out {
        CheckoutStatus::SoldOut
    } else if policy.require_preorder_agreement && !preorder_accepted {
        CheckoutStatus::PreorderAgreementRequired
    } else if completed_required < total_required {
        CheckoutStatus::Incomplete {
            completed: completed_required,
            total: total_required,
        }
    } else if policy.block_on_conflict && conflicts.has_active_conflict {
        CheckoutStatus::ConflictsBlocking
    } else {
        CheckoutStatus::Ready
    };

    let mut warnings = Vec::new();
    if conflicts.has_active_conflict && !policy.block_on_conflict {
        warnings.push(ReadinessWarning::Conflict);
    }
    if conflicts.missing_required {
        warnings.push(ReadinessWarning::IncompleteBuild);
    }

    Ok(ReadinessReport {
        formatted_total: catalog.format_price(total),
        total_price: total,
        completed_required,
        total_required,
        has_sold_out: sold_out,
        missing_required: conflicts.missing_required,
        has_active_conflict: conflicts.has_active_conflict,
        can_checkout: status.is_ready(),
        label: status.label(),
        status,
        warnings,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::evaluate;
    use crate::selection::SelectionKind;
    use crate::test_support::{keycaps_catalog, scenario_catalog, CASE_A, CASE_B, PCB_X, PCB_Y};
    use crate::types::VariantId;

    fn pick(catalog: &Catalog, store: &mut SelectionStore, handle: &str, id: VariantId) {
        let component = catalog.component(handle).unwrap();
        store
            .select(component, component.variant(id).unwrap(), SelectionKind::Primary, 1)
            .unwrap();
    }

    fn assess_default(catalog: &Catalog, store: &SelectionStore) -> ReadinessReport {
        let conflicts = evaluate(catalog, store);
        assess(catalog, store, &conflicts, ReadinessPolicy::default(), false).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let catalog = scenario_catalog();
        let report = assess_default(&catalog, &SelectionStore::new());

        assert_eq!(report.status, CheckoutStatus::NoComponentsSelected);
        assert!(!report.can_checkout);
        assert_eq!(report.formatted_total, "$0.00");
        assert_eq!(report.total_required, 2);
    }

    #[test]
    fn test_incomplete_label() {
        let catalog = scenario_catalog();
        let mut store = SelectionStore::new();
        pick(&catalog, &mut store, "case", CASE_A);

        let report = assess_default(&catalog, &store);
        assert_eq!(report.label, "1 / 2 Components Selected");
        assert!(report.missing_required);
        assert!(report.warnings.contains(&ReadinessWarning::IncompleteBuild));
        assert!(!report.can_checkout);
    }

    #[test]
    fn test_sold_out_blocks_checkout() {
        let catalog = scenario_catalog();
        let mut store = SelectionStore::new();
        pick(&catalog, &mut store, "case", CASE_B);
        pick(&catalog, &mut store, "pcb", PCB_X);

        let report = assess_default(&catalog, &store);
        assert!(report.has_sold_out);
        assert_eq!(report.label, "Contains Sold Out Components");
        assert!(!report.can_checkout);
    }

    #[test]
    fn test_conflict_warns_by_default_and_blocks_on_request() {
        let catalog = keycaps_conflict_catalog();
        let mut store = SelectionStore::new();
        pick(&catalog, &mut store, "case", 1);
        pick(&catalog, &mut store, "keycaps", 21);
        let conflicts = evaluate(&catalog, &store);
        assert!(conflicts.has_active_conflict);

        let lenient = assess(&catalog, &store, &conflicts, ReadinessPolicy::default(), false)
            .unwrap();
        assert!(lenient.can_checkout);
        assert_eq!(lenient.warnings, vec![ReadinessWarning::Conflict]);

        let strict = ReadinessPolicy {
            block_on_conflict: true,
            ..Default::default()
        };
        let blocked = assess(&catalog, &store, &conflicts, strict, false).unwrap();
        assert!(!blocked.can_checkout);
        assert_eq!(blocked.label, "Resolve Component Conflicts");
        assert!(blocked.warnings.is_empty());
    }

    #[test]
    fn test_preorder_agreement_gate() {
        let catalog = scenario_catalog();
        let mut store = SelectionStore::new();
        pick(&catalog, &mut store, "case", CASE_A);
        pick(&catalog, &mut store, "pcb", PCB_Y);
        let conflicts = evaluate(&catalog, &store);
        let policy = ReadinessPolicy {
            require_preorder_agreement: true,
            ..Default::default()
        };

        let pending = assess(&catalog, &store, &conflicts, policy, false).unwrap();
        assert_eq!(pending.status, CheckoutStatus::PreorderAgreementRequired);

        let accepted = assess(&catalog, &store, &conflicts, policy, true).unwrap();
        assert!(accepted.can_checkout);
        assert_eq!(accepted.label, "Add to Cart");
        assert_eq!(accepted.formatted_total, "$180.00");
    }

    #[test]
    fn test_total_includes_additional_quantities() {
        let catalog = keycaps_catalog();
        let keycaps = catalog.component("keycaps").unwrap();
        let mut store = SelectionStore::new();
        store
            .select(keycaps, &keycaps.variants[0], SelectionKind::Additional, 3)
            .unwrap();
        store
            .select(keycaps, &keycaps.variants[1], SelectionKind::Additional, 1)
            .unwrap();

        // 3 × 49.99 + 59.99
        assert_eq!(total_price(&store).unwrap(), Money::from_minor(20996));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let catalog = Catalog::from_json(&format!(
            r#"{{"components": [{{"handle": "gold", "title": "Gold",
                "variants": [{{"id": 1, "title": "Solid", "price": {}}}]}}]}}"#,
            i64::MAX / 2
        ))
        .unwrap();
        let gold = catalog.component("gold").unwrap();
        let mut store = SelectionStore::new();
        store
            .select(gold, &gold.variants[0], SelectionKind::Additional, 3)
            .unwrap();

        assert!(matches!(total_price(&store), Err(CoreError::PriceOverflow)));
    }

    fn keycaps_conflict_catalog() -> Catalog {
        Catalog::from_json(
            r#"{
                "components": [
                    {"handle": "case", "title": "Case", "required": true,
                     "variants": [{"id": 1, "title": "Default Title", "price": 10000}]},
                    {"handle": "keycaps", "title": "Keycaps",
                     "options": [{"name": "Profile"}],
                     "variants": [{"id": 21, "title": "Cherry", "price": 4000}]}
                ],
                "conflicts": [{"component1": "case", "component1_variants": [1],
                               "component2": "keycaps", "component2_variants": [21]}]
            }"#,
        )
        .unwrap()
    }
}
