//! The buyer's in-progress selection.
//!
//! A [`Cart`] holds at most one [`CartItem`] per variant. Every operation
//! consumes the cart and returns the next snapshot, so callers always store
//! a complete, consistent value (the portal keeps it in the buyer's session).
//! Totals are derived on every call and never cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, SelectedOption, Variant};
use crate::types::{Price, ProductId, VariantId, format_amount};

/// Smallest cart total (in EUR, excluding tax) that may be submitted.
pub const MINIMUM_ORDER_VALUE: Decimal = Decimal::from_parts(250, 0, 0, false, 0);

/// Product fields captured when a variant is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    pub image_url: Option<String>,
}

/// Variant fields captured when a variant is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSnapshot {
    pub title: String,
    pub sku: Option<String>,
    pub selected_options: Vec<SelectedOption>,
    /// Normalized size (`"42"`, `"One Size"`), if the variant has one.
    #[serde(default)]
    pub size: Option<String>,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub variant_id: VariantId,
    pub product: ProductSnapshot,
    pub variant: VariantSnapshot,
    /// Always at least 1 while stored in a cart.
    pub quantity: u32,
    /// Wholesale unit price at the time of adding.
    pub unit_price: Price,
}

impl CartItem {
    /// Build a cart line from catalog data.
    #[must_use]
    pub fn from_catalog(product: &Product, variant: &Variant, quantity: u32) -> Self {
        Self {
            variant_id: variant.id.clone(),
            product: ProductSnapshot {
                id: product.id.clone(),
                title: product.title.clone(),
                handle: product.handle.clone(),
                image_url: variant
                    .image_url
                    .clone()
                    .or_else(|| product.image_url.clone()),
            },
            variant: VariantSnapshot {
                title: variant.title.clone(),
                sku: variant.sku.clone(),
                selected_options: variant.selected_options.clone(),
                size: variant.size_key(),
            },
            quantity,
            unit_price: variant.price,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.amount * Decimal::from(self.quantity)
    }
}

/// Whether a cart meets the minimum order value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumOrderStatus {
    pub met: bool,
    pub total: Decimal,
    pub minimum: Decimal,
    /// Amount still needed; zero once the minimum is met.
    pub shortfall: Decimal,
}

impl MinimumOrderStatus {
    /// Evaluate `total` against [`MINIMUM_ORDER_VALUE`].
    #[must_use]
    pub fn for_total(total: Decimal) -> Self {
        let shortfall = (MINIMUM_ORDER_VALUE - total).max(Decimal::ZERO);
        Self {
            met: shortfall.is_zero(),
            total,
            minimum: MINIMUM_ORDER_VALUE,
            shortfall,
        }
    }

    /// Buyer-facing notice, e.g. `Nog €150.00 nodig (minimum €250.00)`.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        (!self.met).then(|| {
            format!(
                "Nog €{} nodig (minimum €{})",
                format_amount(self.shortfall),
                format_amount(self.minimum)
            )
        })
    }
}

/// Snapshot of a buyer's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add `item.quantity` units, merging with an existing line for the same
    /// variant. Adding zero units changes nothing.
    #[must_use]
    pub fn add_item(mut self, item: CartItem) -> Self {
        if item.quantity == 0 {
            return self;
        }
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.variant_id == item.variant_id)
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        self
    }

    /// Set the exact quantity of a line. Zero or less removes it; unknown
    /// variants are ignored.
    #[must_use]
    pub fn update_quantity(mut self, variant_id: &VariantId, quantity: i64) -> Self {
        if quantity <= 0 {
            return self.remove_item(variant_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|i| &i.variant_id == variant_id) {
            item.quantity = quantity;
        }
        self
    }

    /// Remove a line if present.
    #[must_use]
    pub fn remove_item(mut self, variant_id: &VariantId) -> Self {
        self.items.retain(|i| &i.variant_id != variant_id);
        self
    }

    /// Drop every line.
    #[must_use]
    pub fn clear(self) -> Self {
        Self::new()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by variant.
    #[must_use]
    pub fn get(&self, variant_id: &VariantId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.variant_id == variant_id)
    }

    /// Units of `variant_id` currently in the cart.
    #[must_use]
    pub fn quantity_of(&self, variant_id: &VariantId) -> u32 {
        self.get(variant_id).map_or(0, |i| i.quantity)
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn minimum_order_status(&self) -> MinimumOrderStatus {
        MinimumOrderStatus::for_total(self.total_price())
    }

    /// Shortfall notice while the cart is below the minimum.
    #[must_use]
    pub fn shortfall_message(&self) -> Option<String> {
        self.minimum_order_status().message()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::types::CurrencyCode;
    use std::collections::HashSet;
    use std::str::FromStr;

    pub(crate) fn item(variant: u64, price: &str, quantity: u32) -> CartItem {
        CartItem {
            variant_id: VariantId::from_numeric(variant),
            product: ProductSnapshot {
                id: ProductId::from_numeric(1),
                title: "Runner X".to_owned(),
                handle: "runner-x".to_owned(),
                image_url: None,
            },
            variant: VariantSnapshot {
                title: format!("{variant} / Black"),
                sku: Some(format!("RX-{variant}")),
                selected_options: Vec::new(),
                size: Some(variant.to_string()),
            },
            quantity,
            unit_price: Price::new(Decimal::from_str(price).unwrap(), CurrencyCode::EUR),
        }
    }

    #[test]
    fn test_add_merges_same_variant() {
        let cart = Cart::new()
            .add_item(item(42, "50.00", 2))
            .add_item(item(42, "50.00", 3));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(&VariantId::from_numeric(42)), 5);
        assert_eq!(cart.total_price(), Decimal::from(250));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let cart = Cart::new().add_item(item(42, "50.00", 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_exactly() {
        let id = VariantId::from_numeric(41);
        let cart = Cart::new().add_item(item(41, "10.00", 4));
        let cart = cart.update_quantity(&id, 7);
        assert_eq!(cart.quantity_of(&id), 7);
        assert_eq!(cart.total_items(), 7);
    }

    #[test]
    fn test_update_quantity_non_positive_removes() {
        let id = VariantId::from_numeric(41);
        let cart = Cart::new().add_item(item(41, "10.00", 4));
        assert!(cart.clone().update_quantity(&id, 0).is_empty());
        assert!(cart.update_quantity(&id, -3).is_empty());
    }

    #[test]
    fn test_update_unknown_variant_ignored() {
        let cart = Cart::new().add_item(item(41, "10.00", 1));
        let cart = cart.update_quantity(&VariantId::from_numeric(99), 5);
        assert_eq!(cart.items().len(), 1);
        assert!(cart.get(&VariantId::from_numeric(99)).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let cart = Cart::new()
            .add_item(item(41, "10.00", 1))
            .add_item(item(42, "10.00", 1));
        let cart = cart.remove_item(&VariantId::from_numeric(41));
        assert_eq!(cart.items().len(), 1);
        let cart = cart.remove_item(&VariantId::from_numeric(41));
        assert_eq!(cart.items().len(), 1);
        assert!(cart.clear().is_empty());
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let mut cart = Cart::new();
        let ops: [(u64, i64); 10] = [
            (40, 2),
            (41, 1),
            (40, 3),
            (42, -1),
            (41, 0),
            (43, 6),
            (40, 1),
            (43, -2),
            (44, 4),
            (44, 4),
        ];
        for (variant, delta) in ops {
            let id = VariantId::from_numeric(variant);
            cart = if delta > 0 {
                cart.add_item(item(variant, "12.50", u32::try_from(delta).unwrap()))
            } else {
                let next = i64::from(cart.quantity_of(&id)) + delta;
                cart.update_quantity(&id, next)
            };

            let unique: HashSet<_> = cart.items().iter().map(|i| &i.variant_id).collect();
            assert_eq!(unique.len(), cart.items().len());
            assert!(cart.items().iter().all(|i| i.quantity >= 1));
            let expected: Decimal = cart
                .items()
                .iter()
                .map(|i| i.unit_price.amount * Decimal::from(i.quantity))
                .sum();
            assert_eq!(cart.total_price(), expected);
        }
    }

    #[test]
    fn test_minimum_order_status() {
        let below = Cart::new().add_item(item(42, "100.00", 1));
        let status = below.minimum_order_status();
        assert!(!status.met);
        assert_eq!(status.shortfall, Decimal::from(150));
        assert_eq!(
            below.shortfall_message().as_deref(),
            Some("Nog €150.00 nodig (minimum €250.00)")
        );

        let above = Cart::new().add_item(item(42, "130.00", 2));
        assert!(above.minimum_order_status().met);
        assert_eq!(above.shortfall_message(), None);
    }

    #[test]
    fn test_exact_minimum_is_met() {
        let cart = Cart::new().add_item(item(42, "125.00", 2));
        assert!(cart.minimum_order_status().met);
    }
}
