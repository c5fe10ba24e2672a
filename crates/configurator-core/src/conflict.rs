//! # Conflict Evaluator
//!
//! Detects selected variants that are incompatible with what is selected on
//! another component, and proposes compatible alternatives.
//!
//! ## Evaluating One Rule
//! ```text
//! Rule: plate [ISO]  ✕  pcb [HOTSWAP]
//!
//!   plate selections      pcb selections        result
//!   ────────────────      ──────────────        ─────────────────────────────
//!   (none)                HOTSWAP               vacuous: nothing to compare
//!   ISO                   SOLDER                fine: pcb has a safe partner
//!   ISO                   HOTSWAP               ISO in conflict   (record 1)
//!                                               HOTSWAP in conflict (record 2)
//!   ISO                   HOTSWAP + SOLDER      fine: SOLDER is a safe partner
//! ```
//!
//! Both sides of a rule are evaluated independently. Records from different
//! rules are all kept, even when they name the same variant. The report is
//! recomputed from scratch after every mutation; nothing is cached.

use serde::Serialize;
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::selection::{SelectedVariant, SelectionKind, SelectionStore};
use crate::types::{Component, ConflictRule, VariantId};

// =============================================================================
// Report Types
// =============================================================================

/// A partner variant that would resolve a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConflictSuggestion {
    pub component: String,
    pub variant_id: VariantId,
    pub title: String,
    pub available: bool,
}

/// One selected variant that violates one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConflictRecord {
    /// Handle of the component holding the offending variant.
    pub component: String,
    /// Whether the offending variant is the primary or an additional selection.
    pub kind: SelectionKind,
    pub variant_id: VariantId,
    pub variant_title: String,
    pub partner_component: String,
    /// The partner's current selections, all of them in the rule's conflict set.
    pub partner_variant_ids: Vec<VariantId>,
    pub partner_variant_titles: Vec<String>,
    /// "The Aluminium / Silver Case is incompatible with the Hotswap PCB."
    pub message: String,
    pub disclaimer: String,
    /// Partner variants outside the rule's conflict set, in catalog order.
    pub suggestions: Vec<ConflictSuggestion>,
    pub rule_index: usize,
}

/// Result of evaluating every rule against the current selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConflictReport {
    pub conflicts: Vec<ConflictRecord>,
    pub has_active_conflict: bool,
    /// Some required component has no primary selection.
    pub missing_required: bool,
}

impl ConflictReport {
    /// Records whose offending variant belongs to `handle`.
    pub fn for_component<'a>(&'a self, handle: &'a str) -> impl Iterator<Item = &'a ConflictRecord> {
        self.conflicts.iter().filter(move |c| c.component == handle)
    }

    /// Whether a specific selected variant carries a conflict badge.
    pub fn is_in_conflict(&self, handle: &str, variant_id: VariantId) -> bool {
        self.for_component(handle).any(|c| c.variant_id == variant_id)
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates the catalog's own rules against `store`.
pub fn evaluate(catalog: &Catalog, store: &SelectionStore) -> ConflictReport {
    evaluate_rules(catalog, store, catalog.conflicts())
}

/// Evaluates an explicit rule list against `store`.
///
/// Rules that name a component missing from the catalog are skipped; the
/// catalog reports them once at load time.
pub fn evaluate_rules(
    catalog: &Catalog,
    store: &SelectionStore,
    rules: &[ConflictRule],
) -> ConflictReport {
    let missing_required = catalog
        .components()
        .iter()
        .any(|c| c.required && store.primary(&c.handle).is_none());

    let mut conflicts = Vec::new();

    for (rule_index, rule) in rules.iter().enumerate() {
        let (Some(first), Some(second)) = (
            catalog.component(&rule.component1),
            catalog.component(&rule.component2),
        ) else {
            continue;
        };

        let side_one = Side {
            component: first,
            conflict_ids: &rule.component1_variants,
        };
        let side_two = Side {
            component: second,
            conflict_ids: &rule.component2_variants,
        };

        // Vacuous unless both components have something selected.
        if store.union(&first.handle).is_empty() || store.union(&second.handle).is_empty() {
            continue;
        }

        let ctx = RuleContext {
            catalog,
            store,
            rule,
            rule_index,
        };
        ctx.check_side(&side_one, &side_two, &mut conflicts);
        ctx.check_side(&side_two, &side_one, &mut conflicts);
    }

    ConflictReport {
        has_active_conflict: !conflicts.is_empty(),
        conflicts,
        missing_required,
    }
}

struct Side<'a> {
    component: &'a Component,
    conflict_ids: &'a [VariantId],
}

impl Side<'_> {
    fn is_conflicting(&self, variant_id: VariantId) -> bool {
        self.conflict_ids.contains(&variant_id)
    }
}

struct RuleContext<'a> {
    catalog: &'a Catalog,
    store: &'a SelectionStore,
    rule: &'a ConflictRule,
    rule_index: usize,
}

impl RuleContext<'_> {
    /// Emits a record for every selected `this` variant in the conflict set
    /// when `partner` has no selection outside its own conflict set.
    fn check_side(&self, this: &Side<'_>, partner: &Side<'_>, out: &mut Vec<ConflictRecord>) {
        let partner_selected = self.store.union(&partner.component.handle);
        if partner_selected.iter().any(|v| !partner.is_conflicting(v.id)) {
            return;
        }

        for kind in [SelectionKind::Primary, SelectionKind::Additional] {
            let Some(entry) = self.store.get(&this.component.handle, kind) else {
                continue;
            };
            for variant in entry.variants() {
                if this.is_conflicting(variant.id) {
                    out.push(self.record(this, partner, kind, variant, &partner_selected));
                }
            }
        }
    }

    fn record(
        &self,
        this: &Side<'_>,
        partner: &Side<'_>,
        kind: SelectionKind,
        variant: &SelectedVariant,
        partner_selected: &[&SelectedVariant],
    ) -> ConflictRecord {
        let partner_titles: Vec<String> =
            partner_selected.iter().map(|v| v.title.clone()).collect();

        let message = format!(
            "The {} {} is incompatible with the {} {}.",
            variant.title,
            self.catalog
                .format_component_title(this.component, SelectionKind::Primary),
            partner_titles.join(", "),
            self.catalog
                .format_component_title(partner.component, SelectionKind::Primary),
        );

        let suggestions = partner
            .component
            .variants
            .iter()
            .filter(|v| !partner.is_conflicting(v.id))
            .map(|v| ConflictSuggestion {
                component: partner.component.handle.clone(),
                variant_id: v.id,
                title: v.title.clone(),
                available: v.available,
            })
            .collect();

        ConflictRecord {
            component: this.component.handle.clone(),
            kind,
            variant_id: variant.id,
            variant_title: variant.title.clone(),
            partner_component: partner.component.handle.clone(),
            partner_variant_ids: partner_selected.iter().map(|v| v.id).collect(),
            partner_variant_titles: partner_titles,
            message,
            disclaimer: self.rule.disclaimer.clone(),
            suggestions,
            rule_index: self.rule_index,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
