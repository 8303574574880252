//! Per-product aggregation of order items for commercial documents.
//!
//! Items are grouped by their exact product title. The first item of a group
//! supplies its image, SKU and unit price; later items only add quantities
//! and values. Each group also carries its quantities laid out on the fixed
//! EU size bar, plus any sizes that do not fit on it.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderItem;
use crate::size::{SIZE_BAR, extract_size};

/// One product row on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedProduct {
    pub product_title: String,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub unit_price: Decimal,
    pub total_pieces: u64,
    pub total_value: Decimal,
    /// Size label to aggregated quantity.
    pub sizes: BTreeMap<String, u64>,
    /// One cell per size of [`SIZE_BAR`], zero where nothing was ordered.
    pub size_bar: Vec<SizeBarCell>,
    /// Sizes outside the bar (e.g. `"35"`, `"One Size"`).
    pub off_bar_sizes: Vec<OffBarSize>,
}

/// One cell of the fixed EU size bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBarCell {
    pub size: u8,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffBarSize {
    pub label: String,
    pub quantity: u64,
}

impl GroupedProduct {
    fn start(item: &OrderItem) -> Self {
        Self {
            product_title: item.product_title.clone(),
            image_url: item.image_url.clone(),
            sku: item.sku.clone(),
            unit_price: item.unit_price,
            total_pieces: 0,
            total_value: Decimal::ZERO,
            sizes: BTreeMap::new(),
            size_bar: Vec::new(),
            off_bar_sizes: Vec::new(),
        }
    }

    fn absorb(&mut self, item: &OrderItem) {
        let quantity = u64::from(item.quantity);
        self.total_pieces += quantity;
        self.total_value += item.total_price;
        if let Some(size) = extract_size(item.variant_title.as_deref()) {
            *self.sizes.entry(size).or_insert(0) += quantity;
        }
    }

    /// Lay the aggregated sizes out once every item is absorbed.
    fn finish(mut self) -> Self {
        self.size_bar = SIZE_BAR
            .iter()
            .map(|size| SizeBarCell {
                size: *size,
                quantity: self.sizes.get(&size.to_string()).copied().unwrap_or(0),
            })
            .collect();
        self.off_bar_sizes = self
            .sizes
            .iter()
            .filter(|(label, _)| !label.parse::<u8>().is_ok_and(|n| SIZE_BAR.contains(&n)))
            .map(|(label, quantity)| OffBarSize {
                label: label.clone(),
                quantity: *quantity,
            })
            .collect();
        self
    }
}

/// Group order items by product title, preserving first-occurrence order.
#[must_use]
pub fn group_order_items(items: &[OrderItem]) -> Vec<GroupedProduct> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupedProduct> = Vec::new();

    for item in items {
        let slot = *index.entry(item.product_title.as_str()).or_insert_with(|| {
            groups.push(GroupedProduct::start(item));
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(slot) {
            group.absorb(item);
        }
    }

    groups.into_iter().map(GroupedProduct::finish).collect()
}

/// Total pieces across all groups.
#[must_use]
pub fn total_pieces(groups: &[GroupedProduct]) -> u64 {
    groups.iter().map(|g| g.total_pieces).sum()
}
