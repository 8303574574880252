//! Stock reconciliation between the catalog, the cart and remote stock.
//!
//! Stock comes from a separate, fallible fetch. A snapshot may be partial or
//! empty; a variant missing from it has *unknown* stock, which is capped at
//! [`UNKNOWN_STOCK_CAP`] rather than treated as sold out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::{Product, Variant};
use crate::types::VariantId;

/// Orderable cap for a variant whose stock is unknown.
pub const UNKNOWN_STOCK_CAP: u32 = 9_999;

/// Stock level of a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "quantity", rename_all = "snake_case")]
pub enum StockLevel {
    Known(i64),
    Unknown,
}

/// Point-in-time stock counts keyed by variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    levels: HashMap<VariantId, i64>,
}

impl StockSnapshot {
    /// A snapshot with no known levels (every variant unknown).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variant_id: VariantId, quantity: i64) {
        self.levels.insert(variant_id, quantity);
    }

    #[must_use]
    pub fn level(&self, variant_id: &VariantId) -> StockLevel {
        self.levels
            .get(variant_id)
            .map_or(StockLevel::Unknown, |q| StockLevel::Known(*q))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(VariantId, i64)> for StockSnapshot {
    fn from_iter<T: IntoIterator<Item = (VariantId, i64)>>(iter: T) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

fn stock_cap(level: StockLevel) -> u32 {
    match level {
        StockLevel::Known(quantity) => u32::try_from(quantity.max(0)).unwrap_or(u32::MAX),
        StockLevel::Unknown => UNKNOWN_STOCK_CAP,
    }
}

/// Additional units that may be added on top of `in_cart`.
///
/// Unavailable variants are never orderable. With known stock the result is
/// `max(0, stock - in_cart)`.
#[must_use]
pub fn max_additional(available: bool, level: StockLevel, in_cart: u32) -> u32 {
    if !available {
        return 0;
    }
    stock_cap(level).saturating_sub(in_cart)
}

/// Largest exact quantity a cart line for this variant may hold.
#[must_use]
pub fn max_cart_quantity(available: bool, level: StockLevel) -> u32 {
    if available { stock_cap(level) } else { 0 }
}

/// Clamp a requested quantity into `[0, max]`.
#[must_use]
pub fn clamp_quantity(requested: i64, max: u32) -> u32 {
    u32::try_from(requested.max(0)).map_or(max, |r| r.min(max))
}

/// Per-variant orderability as shown next to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStock {
    pub variant_id: VariantId,
    /// Normalized size shown next to the quantity controls.
    pub size: Option<String>,
    pub available: bool,
    pub stock: StockLevel,
    pub in_cart: u32,
    pub max_additional: u32,
}

/// Applies a stock snapshot to cart mutations.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    snapshot: &'a StockSnapshot,
    cart: &'a Cart,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub const fn new(snapshot: &'a StockSnapshot, cart: &'a Cart) -> Self {
        Self { snapshot, cart }
    }

    /// Orderability of a variant given what the cart already holds.
    #[must_use]
    pub fn variant_stock(&self, variant: &Variant) -> VariantStock {
        let stock = self.snapshot.level(&variant.id);
        let in_cart = self.cart.quantity_of(&variant.id);
        VariantStock {
            variant_id: variant.id.clone(),
            size: variant.size_key(),
            available: variant.available,
            stock,
            in_cart,
            max_additional: max_additional(variant.available, stock, in_cart),
        }
    }

    /// Units that will actually be added for an add request.
    #[must_use]
    pub fn clamp_add(&self, variant: &Variant, requested: i64) -> u32 {
        clamp_quantity(requested, self.variant_stock(variant).max_additional)
    }

    /// Exact quantity a set request resolves to.
    ///
    /// Lowering the quantity is always honoured; raising it is capped by
    /// stock.
    #[must_use]
    pub fn clamp_set(&self, variant: &Variant, requested: i64) -> u32 {
        let in_cart = self.cart.quantity_of(&variant.id);
        let requested = clamp_quantity(requested, u32::MAX);
        if requested <= in_cart {
            return requested;
        }
        let cap = max_cart_quantity(variant.available, self.snapshot.level(&variant.id));
        requested.min(cap.max(in_cart))
    }

    /// Orderability for every variant of every product.
    #[must_use]
    pub fn catalog_stock(&self, products: &[Product]) -> Vec<VariantStock> {
        products
            .iter()
            .flat_map(|p| p.variants.iter())
            .map(|v| self.variant_stock(v))
            .collect()
    }
}
