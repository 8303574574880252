//! Catalog products and variants.
//!
//! These are read-only snapshots of the catalog source. The portal never
//! writes products; it only reads them to build carts and orders.

use serde::{Deserialize, Serialize};

use crate::size::{extract_size, is_size_option};
use crate::types::{Price, ProductId, VariantId};

/// A product offered to wholesale buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    /// Category as maintained in the catalog source.
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    pub image_url: Option<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Look up one of this product's variants.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }
}

/// A selected option on a variant (e.g., `Size = 42`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub title: String,
    pub sku: Option<String>,
    pub selected_options: Vec<SelectedOption>,
    /// Wholesale price charged to buyers.
    pub price: Price,
    /// Retail price shown for reference.
    pub compare_at_price: Option<Price>,
    pub available: bool,
    /// Known stock count, if the catalog tracks inventory for this variant.
    pub quantity_available: Option<i64>,
    pub image_url: Option<String>,
}

impl Variant {
    /// Size key for grouping and display.
    ///
    /// A size-like option (`Size`, `Maat`, ...) is preferred; the variant
    /// title is the fallback.
    #[must_use]
    pub fn size_key(&self) -> Option<String> {
        self.selected_options
            .iter()
            .find(|o| is_size_option(&o.name))
            .and_then(|o| extract_size(Some(&o.value)))
            .or_else(|| extract_size(Some(&self.title)))
    }
}

/// Find a variant across a product list, returning it with its product.
#[must_use]
pub fn find_variant<'a>(
    products: &'a [Product],
    id: &VariantId,
) -> Option<(&'a Product, &'a Variant)> {
    products
        .iter()
        .find_map(|p| p.variant(id).map(|v| (p, v)))
}
