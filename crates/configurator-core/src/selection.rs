//! # Selection Store
//!
//! What the buyer has picked so far, per component.
//!
//! ## Keys and Entries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SelectionKey { handle, kind }          SelectionEntry                  │
//! │  ─────────────────────────────          ──────────────────────────────  │
//! │  ("case", Primary)            ─────►    Primary(Black, qty 1)           │
//! │  ("pcb",  Primary)            ─────►    Primary(Hotswap, qty 1)         │
//! │  ("keycaps", Additional)      ─────►    Additional([                    │
//! │                                            Ocean  × 2,                  │
//! │                                            Sunset × 1 ])                │
//! │                                                                         │
//! │  • A key is present only while it holds at least one variant.           │
//! │  • Primary entries hold exactly one variant, quantity 1.                │
//! │  • Additional entries merge repeated picks by variant id.               │
//! │  • Keys keep the order in which they were first selected.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stored variants are frozen snapshots of catalog data taken at selection
//! time, so an entry can be rendered without going back to the catalog.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Component, Variant, VariantId};
use crate::validation::validate_quantity;
use crate::{MAX_ADDITIONAL_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Keys
// =============================================================================

/// Whether a selection fills a component's slot or is an extra purchase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SelectionKind {
    #[default]
    Primary,
    Additional,
}

/// Store key: a component handle plus the kind of selection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub handle: String,
    pub kind: SelectionKind,
}

impl SelectionKey {
    pub fn new(handle: impl Into<String>, kind: SelectionKind) -> Self {
        SelectionKey {
            handle: handle.into(),
            kind,
        }
    }

    pub fn primary(handle: impl Into<String>) -> Self {
        Self::new(handle, SelectionKind::Primary)
    }

    pub fn additional(handle: impl Into<String>) -> Self {
        Self::new(handle, SelectionKind::Additional)
    }
}

// =============================================================================
// Entries
// =============================================================================

/// A variant as it was when selected, with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SelectedVariant {
    pub id: VariantId,
    pub title: String,
    pub option_values: Vec<String>,
    pub price: Money,
    pub available: bool,
    pub quantity: u32,
    pub featured_image: Option<String>,
    pub images: Vec<String>,
}

impl SelectedVariant {
    pub fn from_variant(variant: &Variant, quantity: u32) -> Self {
        SelectedVariant {
            id: variant.id,
            title: variant.title.clone(),
            option_values: variant.option_values.clone(),
            price: variant.price,
            available: variant.available,
            quantity,
            featured_image: variant.featured_image.clone(),
            images: variant.images.clone(),
        }
    }

    /// `price × quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul_quantity(self.quantity)
    }
}

/// The variants held under one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "variants", rename_all = "lowercase")]
pub enum SelectionEntry {
    Primary(SelectedVariant),
    Additional(Vec<SelectedVariant>),
}

impl SelectionEntry {
    pub fn kind(&self) -> SelectionKind {
        match self {
            SelectionEntry::Primary(_) => SelectionKind::Primary,
            SelectionEntry::Additional(_) => SelectionKind::Additional,
        }
    }

    pub fn variants(&self) -> &[SelectedVariant] {
        match self {
            SelectionEntry::Primary(variant) => std::slice::from_ref(variant),
            SelectionEntry::Additional(variants) => variants,
        }
    }

    pub fn contains(&self, variant_id: VariantId) -> bool {
        self.variants().iter().any(|v| v.id == variant_id)
    }
}

// =============================================================================
// Store
// =============================================================================

/// Mutable mapping from [`SelectionKey`] to [`SelectionEntry`].
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: IndexMap<SelectionKey, SelectionEntry>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection and returns the resulting entry.
    ///
    /// ## Behavior by Kind
    /// ```text
    /// Primary     replace whatever the component held (quantity forced to 1)
    /// Additional  same id already listed → quantities add up
    ///             new id                 → appended as a new line
    /// ```
    ///
    /// ## Errors
    /// - `Validation` when `quantity` is 0 or above 999
    /// - `QuantityTooLarge` when a merge would push a line above 999
    /// - `TooManyLines` when an additional entry is full
    pub fn select(
        &mut self,
        component: &Component,
        variant: &Variant,
        kind: SelectionKind,
        quantity: u32,
    ) -> CoreResult<&SelectionEntry> {
        validate_quantity(quantity)?;
        let key = SelectionKey::new(component.handle.clone(), kind);

        match kind {
            SelectionKind::Primary => {
                self.entries.insert(
                    key.clone(),
                    SelectionEntry::Primary(SelectedVariant::from_variant(variant, 1)),
                );
            }
            SelectionKind::Additional => {
                let entry = self
                    .entries
                    .entry(key.clone())
                    .or_insert_with(|| SelectionEntry::Additional(Vec::new()));

                if let SelectionEntry::Additional(lines) = entry {
                    if let Some(line) = lines.iter_mut().find(|l| l.id == variant.id) {
                        let merged = u64::from(line.quantity) + u64::from(quantity);
                        if merged > u64::from(MAX_ITEM_QUANTITY) {
                            return Err(CoreError::QuantityTooLarge {
                                requested: merged,
                                max: MAX_ITEM_QUANTITY,
                            });
                        }
                        line.quantity = merged as u32;
                    } else {
                        if lines.len() >= MAX_ADDITIONAL_LINES {
                            return Err(CoreError::TooManyLines {
                                handle: component.handle.clone(),
                                max: MAX_ADDITIONAL_LINES,
                            });
                        }
                        lines.push(SelectedVariant::from_variant(variant, quantity));
                    }
                }
            }
        }

        self.entries
            .get(&key)
            .ok_or_else(|| CoreError::UnknownComponent(component.handle.clone()))
    }

    /// Removes one variant from a key. Returns whether anything was removed.
    ///
    /// Removing the last variant deletes the key.
    pub fn remove(&mut self, handle: &str, variant_id: VariantId, kind: SelectionKind) -> bool {
        let key = SelectionKey::new(handle, kind);

        let (removed, now_empty) = match self.entries.get_mut(&key) {
            None => return false,
            Some(SelectionEntry::Primary(variant)) => (variant.id == variant_id, true),
            Some(SelectionEntry::Additional(lines)) => {
                let before = lines.len();
                lines.retain(|l| l.id != variant_id);
                (lines.len() != before, lines.is_empty())
            }
        };

        if removed && now_empty {
            self.entries.shift_remove(&key);
        }
        removed
    }

    /// Drops everything held under a key.
    pub fn remove_component(&mut self, handle: &str, kind: SelectionKind) -> bool {
        self.entries
            .shift_remove(&SelectionKey::new(handle, kind))
            .is_some()
    }

    /// Sets the quantity of an additional line.
    ///
    /// `quantity < 1` is ignored (returns `Ok(false)`); this never deletes a
    /// line. Returns `Ok(true)` when a line was updated.
    pub fn set_quantity(
        &mut self,
        handle: &str,
        variant_id: VariantId,
        quantity: u32,
    ) -> CoreResult<bool> {
        if quantity < 1 {
            return Ok(false);
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: u64::from(quantity),
                max: MAX_ITEM_QUANTITY,
            });
        }

        let key = SelectionKey::additional(handle);
        match self.entries.get_mut(&key) {
            Some(SelectionEntry::Additional(lines)) => {
                match lines.iter_mut().find(|l| l.id == variant_id) {
                    Some(line) => {
                        line.quantity = quantity;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            _ => Ok(false),
        }
    }

    pub fn get(&self, handle: &str, kind: SelectionKind) -> Option<&SelectionEntry> {
        self.entries.get(&SelectionKey::new(handle, kind))
    }

    /// The primary variant of a component, if any.
    pub fn primary(&self, handle: &str) -> Option<&SelectedVariant> {
        match self.get(handle, SelectionKind::Primary) {
            Some(SelectionEntry::Primary(variant)) => Some(variant),
            _ => None,
        }
    }

    /// Primary then additional variants of a component.
    pub fn union(&self, handle: &str) -> Vec<&SelectedVariant> {
        [SelectionKind::Primary, SelectionKind::Additional]
            .into_iter()
            .filter_map(|kind| self.get(handle, kind))
            .flat_map(SelectionEntry::variants)
            .collect()
    }

    /// Required components holding a primary selection.
    pub fn completed_required_count(&self, components: &[Component]) -> usize {
        components
            .iter()
            .filter(|c| c.required && self.primary(&c.handle).is_some())
            .count()
    }

    /// Entries in first-selected order.
    pub fn iter(&self) -> impl Iterator<Item = (&SelectionKey, &SelectionEntry)> {
        self.entries.iter()
    }

    /// Every selected variant across all entries, in store order.
    pub fn all_variants(&self) -> impl Iterator<Item = (&SelectionKey, &SelectedVariant)> {
        self.entries
            .iter()
            .flat_map(|(key, entry)| entry.variants().iter().map(move |v| (key, v)))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
