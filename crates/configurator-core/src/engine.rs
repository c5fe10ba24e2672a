//! # Configurator Engine
//!
//! The facade the rendering layer talks to. It owns the catalog and the
//! selection store, and answers every command with a fresh snapshot.
//!
//! ## Command Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  choice event (dropdowns filled, quantity typed, card removed)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  VariantResolver        values ──► Option<&Variant>                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SelectionStore         mutate (select / remove / set_quantity)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  conflict::evaluate  +  pricing::assess     FULL recompute, no caches   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ConfigurationSnapshot  (read-only, serializable, TS bindings)          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations are synchronous and run to completion. A failed command leaves
//! the store exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{Catalog, Direction};
use crate::conflict::{self, ConflictRecord, ConflictReport};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payload::{self, CartPayload};
use crate::pricing::{self, CheckoutStatus, ReadinessPolicy, ReadinessWarning};
use crate::resolver::{PositionOptions, VariantResolver};
use crate::selection::{SelectedVariant, SelectionKind, SelectionStore};
use crate::types::{Variant, VariantId};

// =============================================================================
// View Types
// =============================================================================

/// The component the buyer is currently configuring.
///
/// View state only: it never affects selections, conflicts or totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Focus {
    pub handle: String,
    pub kind: SelectionKind,
}

/// A selected variant with its line price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SelectedLineView {
    pub variant: SelectedVariant,
    pub line_total: Money,
    pub formatted_line_total: String,
    pub in_conflict: bool,
}

/// Everything held under one selection key, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SelectionView {
    pub handle: String,
    pub kind: SelectionKind,
    /// "Case", or "Extra Case" for an additional pick of a required component.
    pub component_title: String,
    pub clarifying_text: Option<String>,
    pub lines: Vec<SelectedLineView>,
}

/// Read-only state handed to the rendering layer after every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConfigurationSnapshot {
    /// Selections in catalog order, primary before additional.
    pub selections: Vec<SelectionView>,
    pub total_price: Money,
    pub formatted_total: String,
    pub conflicts: Vec<ConflictRecord>,
    pub has_active_conflict: bool,
    pub missing_required: bool,
    pub has_sold_out: bool,
    pub completed_required: usize,
    pub total_required: usize,
    pub can_checkout: bool,
    pub checkout_status: CheckoutStatus,
    pub checkout_label: String,
    pub warnings: Vec<ReadinessWarning>,
    /// Preview layers of the selected required components, bottom first.
    pub layer_images: Vec<String>,
    pub focus: Option<Focus>,
    pub preorder_accepted: bool,
}

/// Result of [`Configurator::choose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOutcome {
    /// The values resolved to a variant, which is now selected.
    Selected(Box<ConfigurationSnapshot>),
    /// The values match no variant yet; nothing changed.
    Incomplete,
}

// =============================================================================
// Configurator
// =============================================================================

/// In-memory configuration session for one buyer.
#[derive(Debug, Clone)]
pub struct Configurator {
    catalog: Catalog,
    store: SelectionStore,
    focus: Option<Focus>,
    policy: ReadinessPolicy,
    preorder_accepted: bool,
}

impl Configurator {
    pub fn new(catalog: Catalog, policy: ReadinessPolicy) -> Self {
        Configurator {
            catalog,
            store: SelectionStore::new(),
            focus: None,
            policy,
            preorder_accepted: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    pub fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    // -------------------------------------------------------------------------
    // Focus & Navigation
    // -------------------------------------------------------------------------

    /// Moves the focus to a component.
    pub fn set_focus(&mut self, handle: &str, kind: SelectionKind) -> CoreResult<&Focus> {
        self.catalog.require_component(handle)?;
        let focus = self.focus.insert(Focus {
            handle: handle.to_string(),
            kind,
        });
        Ok(&*focus)
    }

    /// Moves the focus to the next or previous component, wrapping around.
    ///
    /// Required components are focused as primary selections, optional ones
    /// as additional selections.
    pub fn navigate(&mut self, direction: Direction) -> &Focus {
        let current = self.focus.as_ref().map(|f| f.handle.as_str());
        let next = self.catalog.next_component(current, direction);
        let kind = if next.required {
            SelectionKind::Primary
        } else {
            SelectionKind::Additional
        };
        let handle = next.handle.clone();
        self.focus.insert(Focus { handle, kind })
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn resolver(&self, handle: &str) -> CoreResult<VariantResolver<'_>> {
        let component = self.catalog.require_component(handle)?;
        Ok(VariantResolver::new(component, self.catalog.currency_symbol()))
    }

    /// Legal values for one dropdown of a component.
    pub fn options_for_position(
        &self,
        handle: &str,
        position: usize,
        prior: &BTreeMap<usize, String>,
    ) -> CoreResult<PositionOptions> {
        Ok(self.resolver(handle)?.options_for_position(position, prior))
    }

    /// The variant matching a complete set of dropdown values, if any.
    pub fn matching_variant<S: AsRef<str>>(
        &self,
        handle: &str,
        values: &[S],
    ) -> CoreResult<Option<&Variant>> {
        Ok(self.resolver(handle)?.matching_variant(values))
    }

    pub fn conflicts(&self) -> ConflictReport {
        conflict::evaluate(&self.catalog, &self.store)
    }

    /// Recomputes everything from the current selections.
    pub fn snapshot(&self) -> CoreResult<ConfigurationSnapshot> {
        let report = self.conflicts();
        let readiness = pricing::assess(
            &self.catalog,
            &self.store,
            &report,
            self.policy,
            self.preorder_accepted,
        )?;

        let mut selections = Vec::new();
        for component in self.catalog.components() {
            for kind in [SelectionKind::Primary, SelectionKind::Additional] {
                let Some(entry) = self.store.get(&component.handle, kind) else {
                    continue;
                };

                let lines = entry
                    .variants()
                    .iter()
                    .map(|variant| {
                        let line_total = variant.line_total().ok_or(CoreError::PriceOverflow)?;
                        Ok(SelectedLineView {
                            line_total,
                            formatted_line_total: self.catalog.format_price(line_total),
                            in_conflict: report.conflicts.iter().any(|c| {
                                c.component == component.handle
                                    && c.kind == kind
                                    && c.variant_id == variant.id
                            }),
                            variant: variant.clone(),
                        })
                    })
                    .collect::<CoreResult<Vec<_>>>()?;

                selections.push(SelectionView {
                    handle: component.handle.clone(),
                    kind,
                    component_title: self.catalog.format_component_title(component, kind),
                    clarifying_text: component.clarifying_text.clone(),
                    lines,
                });
            }
        }

        Ok(ConfigurationSnapshot {
            selections,
            total_price: readiness.total_price,
            formatted_total: readiness.formatted_total,
            conflicts: report.conflicts,
            has_active_conflict: readiness.has_active_conflict,
            missing_required: readiness.missing_required,
            has_sold_out: readiness.has_sold_out,
            completed_required: readiness.completed_required,
            total_required: readiness.total_required,
            can_checkout: readiness.can_checkout,
            checkout_status: readiness.status,
            checkout_label: readiness.label,
            warnings: readiness.warnings,
            layer_images: payload::layer_images(&self.catalog, &self.store),
            focus: self.focus.clone(),
            preorder_accepted: self.preorder_accepted,
        })
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Resolves dropdown values and selects the matching variant.
    ///
    /// An unresolved set of values is not an error: it yields
    /// [`ChoiceOutcome::Incomplete`] and leaves the store untouched.
    pub fn choose<S: AsRef<str>>(
        &mut self,
        handle: &str,
        kind: SelectionKind,
        values: &[S],
        quantity: u32,
    ) -> CoreResult<ChoiceOutcome> {
        let variant_id = match self.matching_variant(handle, values)? {
            Some(variant) => variant.id,
            None => return Ok(ChoiceOutcome::Incomplete),
        };
        let snapshot = self.select(handle, variant_id, kind, quantity)?;
        Ok(ChoiceOutcome::Selected(Box::new(snapshot)))
    }

    /// Selects a variant by id.
    pub fn select(
        &mut self,
        handle: &str,
        variant_id: VariantId,
        kind: SelectionKind,
        quantity: u32,
    ) -> CoreResult<ConfigurationSnapshot> {
        let component = self.catalog.require_component(handle)?;
        let variant = self.catalog.require_variant(handle, variant_id)?;
        let mut next = self.store.clone();
        next.select(component, variant, kind, quantity)?;
        self.commit(next)
    }

    /// Removes one variant from a selection key.
    pub fn remove(
        &mut self,
        handle: &str,
        variant_id: VariantId,
        kind: SelectionKind,
    ) -> CoreResult<ConfigurationSnapshot> {
        self.catalog.require_component(handle)?;
        self.store.remove(handle, variant_id, kind);
        self.snapshot()
    }

    /// Removes everything under a selection key.
    pub fn remove_component(
        &mut self,
        handle: &str,
        kind: SelectionKind,
    ) -> CoreResult<ConfigurationSnapshot> {
        self.catalog.require_component(handle)?;
        self.store.remove_component(handle, kind);
        self.snapshot()
    }

    /// Changes the quantity of an additional line; values below one are ignored.
    pub fn set_quantity(
        &mut self,
        handle: &str,
        variant_id: VariantId,
        quantity: u32,
    ) -> CoreResult<ConfigurationSnapshot> {
        self.catalog.require_variant(handle, variant_id)?;
        let mut next = self.store.clone();
        next.set_quantity(handle, variant_id, quantity)?;
        self.commit(next)
    }

    pub fn set_preorder_accepted(&mut self, accepted: bool) -> CoreResult<ConfigurationSnapshot> {
        self.preorder_accepted = accepted;
        self.snapshot()
    }

    /// Drops every selection and the focus.
    pub fn clear(&mut self) -> CoreResult<ConfigurationSnapshot> {
        self.store.clear();
        self.focus = None;
        self.snapshot()
    }

    /// Swaps in a mutated store, but only if its total still prices.
    fn commit(&mut self, next: SelectionStore) -> CoreResult<ConfigurationSnapshot> {
        pricing::total_price(&next)?;
        self.store = next;
        self.snapshot()
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Builds the cart payload under a fresh bundle id.
    pub fn cart_payload(&self) -> CoreResult<(String, CartPayload)> {
        let bundle_id = Uuid::new_v4().to_string();
        let payload = self.cart_payload_with_bundle_id(&bundle_id)?;
        Ok((bundle_id, payload))
    }

    pub fn cart_payload_with_bundle_id(&self, bundle_id: &str) -> CoreResult<CartPayload> {
        payload::build_cart_payload(&self.catalog, &self.store, bundle_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scenario_catalog, CASE_A, CASE_B, PCB_X, PCB_Y};

    fn configurator() -> Configurator {
        Configurator::new(scenario_catalog(), ReadinessPolicy::default())
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut cfg = configurator();

        cfg.select("case", CASE_B, SelectionKind::Primary, 1).unwrap();
        let snapshot = cfg.select("pcb", PCB_Y, SelectionKind::Primary, 1).unwrap();
        assert!(snapshot.has_active_conflict);
        assert_eq!(snapshot.conflicts.len(), 2);
        assert!(snapshot.has_sold_out);
        assert!(!snapshot.can_checkout);
        assert!(snapshot.selections.iter().all(|s| s.lines[0].in_conflict));

        let snapshot = cfg.select("pcb", PCB_X, SelectionKind::Primary, 1).unwrap();
        assert!(!snapshot.has_active_conflict);
        assert!(snapshot.has_sold_out);
        assert!(!snapshot.can_checkout);

        let snapshot = cfg.select("case", CASE_A, SelectionKind::Primary, 1).unwrap();
        assert!(snapshot.can_checkout);
        assert_eq!(snapshot.checkout_label, "Add to Cart");
        assert_eq!(snapshot.formatted_total, "$150.00");
    }

    #[test]
    fn test_removing_required_selection_updates_counts() {
        let mut cfg = configurator();
        cfg.select("case", CASE_A, SelectionKind::Primary, 1).unwrap();
        let before = cfg.select("pcb", PCB_X, SelectionKind::Primary, 1).unwrap();
        assert_eq!(before.completed_required, 2);
        assert!(!before.missing_required);

        let after = cfg.remove("pcb", PCB_X, SelectionKind::Primary).unwrap();
        assert_eq!(after.completed_required, 1);
        assert!(after.missing_required);
        assert_eq!(after.checkout_label, "1 / 2 Components Selected");
    }

    #[test]
    fn test_choose_resolves_dropdown_values() {
        let mut cfg = configurator();

        let outcome = cfg
            .choose("case", SelectionKind::Primary, &["Polycarbonate"], 1)
            .unwrap();
        assert_eq!(outcome, ChoiceOutcome::Incomplete);
        assert!(cfg.store().is_empty());

        let outcome = cfg
            .choose(
                "case",
                SelectionKind::Primary,
                &["polycarbonate", "Clear - $100.00"],
                1,
            )
            .unwrap();
        match outcome {
            ChoiceOutcome::Selected(snapshot) => {
                assert_eq!(snapshot.selections[0].lines[0].variant.id, CASE_A);
            }
            ChoiceOutcome::Incomplete => panic!("expected a selection"),
        }
    }

    #[test]
    fn test_unknown_handles_and_ids_are_typed_errors() {
        let mut cfg = configurator();

        assert!(matches!(
            cfg.select("plate", 1, SelectionKind::Primary, 1),
            Err(CoreError::UnknownComponent(_))
        ));
        assert!(matches!(
            cfg.select("case", 999, SelectionKind::Primary, 1),
            Err(CoreError::UnknownVariant { .. })
        ));
        assert!(matches!(
            cfg.set_quantity("case", 999, 2),
            Err(CoreError::UnknownVariant { .. })
        ));
        assert!(cfg.set_focus("plate", SelectionKind::Primary).is_err());
    }

    #[test]
    fn test_failed_command_leaves_store_untouched() {
        let mut cfg = configurator();
        cfg.select("pcb", PCB_X, SelectionKind::Additional, 990)
            .unwrap();

        assert!(cfg.select("pcb", PCB_X, SelectionKind::Additional, 10).is_err());
        let snapshot = cfg.snapshot().unwrap();
        assert_eq!(snapshot.selections[0].lines[0].variant.quantity, 990);
    }

    #[test]
    fn test_overflowing_total_is_not_committed() {
        let json = r#"{
            "parent_product_title": "Nova 75",
            "components": [{
                "handle": "case",
                "title": "Nova 75 Case",
                "required": true,
                "options": [{ "name": "Color" }],
                "variants": [
                    { "id": 1, "title": "Gold", "price": 4611686018427387903, "available": true }
                ]
            }]
        }"#;
        let mut cfg = Configurator::new(
            Catalog::from_json(json).unwrap(),
            ReadinessPolicy::default(),
        );

        let err = cfg
            .select("case", 1, SelectionKind::Additional, 3)
            .unwrap_err();
        assert!(matches!(err, CoreError::PriceOverflow));
        assert!(cfg.store().is_empty());
        assert!(cfg.snapshot().is_ok());

        cfg.select("case", 1, SelectionKind::Additional, 1).unwrap();
        let err = cfg.set_quantity("case", 1, 3).unwrap_err();
        assert!(matches!(err, CoreError::PriceOverflow));
        let snapshot = cfg.snapshot().unwrap();
        assert_eq!(snapshot.selections[0].lines[0].variant.quantity, 1);
    }

    #[test]
    fn test_additional_lines_and_quantities() {
        let mut cfg = configurator();
        cfg.select("case", CASE_A, SelectionKind::Primary, 1).unwrap();
        cfg.select("case", CASE_A, SelectionKind::Additional, 2)
            .unwrap();

        let snapshot = cfg.set_quantity("case", CASE_A, 4).unwrap();
        let extra = &snapshot.selections[1];
        assert_eq!(extra.kind, SelectionKind::Additional);
        assert_eq!(extra.component_title, "Extra Case");
        assert_eq!(extra.lines[0].formatted_line_total, "$400.00");
        assert_eq!(snapshot.formatted_total, "$500.00");

        // Quantity below one is ignored.
        let snapshot = cfg.set_quantity("case", CASE_A, 0).unwrap();
        assert_eq!(snapshot.formatted_total, "$500.00");

        let snapshot = cfg
            .remove_component("case", SelectionKind::Additional)
            .unwrap();
        assert_eq!(snapshot.selections.len(), 1);
    }

    #[test]
    fn test_cart_payload_uses_generated_bundle_id() {
        let mut cfg = configurator();
        cfg.select("case", CASE_A, SelectionKind::Primary, 1).unwrap();
        cfg.select("pcb", PCB_X, SelectionKind::Primary, 1).unwrap();

        let (bundle_id, payload) = cfg.cart_payload().unwrap();
        assert!(Uuid::parse_str(&bundle_id).is_ok());
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_navigation_sets_focus_kind() {
        let catalog = crate::Catalog::from_json(
            r#"{"components": [
                {"handle": "case", "title": "Case", "required": true},
                {"handle": "keycaps", "title": "Keycaps"}
            ]}"#,
        )
        .unwrap();
        let mut cfg = Configurator::new(catalog, ReadinessPolicy::default());

        assert_eq!(cfg.navigate(Direction::Next).handle, "case");
        let focus = cfg.navigate(Direction::Next).clone();
        assert_eq!(focus.handle, "keycaps");
        assert_eq!(focus.kind, SelectionKind::Additional);
        assert_eq!(cfg.navigate(Direction::Next).handle, "case");
        assert_eq!(cfg.navigate(Direction::Previous).handle, "keycaps");
    }

    #[test]
    fn test_preorder_and_clear() {
        let policy = ReadinessPolicy {
            require_preorder_agreement: true,
            ..Default::default()
        };
        let mut cfg = Configurator::new(scenario_catalog(), policy);
        cfg.select("case", CASE_A, SelectionKind::Primary, 1).unwrap();
        let snapshot = cfg.select("pcb", PCB_Y, SelectionKind::Primary, 1).unwrap();
        assert_eq!(
            snapshot.checkout_label,
            "Please Accept Preorder Agreement"
        );

        let snapshot = cfg.set_preorder_accepted(true).unwrap();
        assert!(snapshot.can_checkout);
        assert!(snapshot.preorder_accepted);

        let snapshot = cfg.clear().unwrap();
        assert!(snapshot.selections.is_empty());
        assert_eq!(snapshot.checkout_label, "No Components Selected");
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut cfg = configurator();
        let snapshot = cfg.select("case", CASE_B, SelectionKind::Primary, 1).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["hasSoldOut"], serde_json::json!(true));
        assert_eq!(json["totalPrice"], serde_json::json!(15000));
        assert_eq!(json["checkoutStatus"]["kind"], serde_json::json!("sold_out"));
    }
}
