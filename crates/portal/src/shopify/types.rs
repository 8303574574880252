//! Shopify Admin REST API payloads.
//!
//! These mirror the JSON returned by `products.json`. Fields the portal does
//! not read are left out; every field that Shopify may omit (for example when
//! a `fields=` filter is applied) is optional or defaulted.

use serde::Deserialize;

/// Envelope of `GET /products.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<RestProduct>,
}

/// A product as returned by the Admin REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RestProduct {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub handle: String,
    pub product_type: Option<String>,
    pub vendor: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub variants: Vec<RestVariant>,
    #[serde(default)]
    pub options: Vec<RestOption>,
    #[serde(default)]
    pub images: Vec<RestImage>,
    pub image: Option<RestImage>,
}

/// A product variant as returned by the Admin REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct RestVariant {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Decimal string, e.g. `"129.95"`.
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    pub sku: Option<String>,
    pub position: Option<i64>,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    /// `"deny"` or `"continue"` (sell when out of stock).
    pub inventory_policy: Option<String>,
    /// `"shopify"` when Shopify tracks stock, `null` when untracked.
    pub inventory_management: Option<String>,
    pub inventory_quantity: Option<i64>,
    pub image_id: Option<u64>,
}

impl RestVariant {
    /// Whether Shopify counts stock for this variant.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.inventory_management.is_some()
    }

    /// Whether the variant can be sold with zero or negative stock.
    #[must_use]
    pub fn oversells(&self) -> bool {
        self.inventory_policy.as_deref() == Some("continue")
    }

    /// Whether the variant's stock limits ordering.
    #[must_use]
    pub fn stock_limited(&self) -> bool {
        self.is_tracked() && !self.oversells()
    }
}

/// A product option (e.g., `Size` with values `41`, `42`).
#[derive(Debug, Clone, Deserialize)]
pub struct RestOption {
    pub name: String,
    pub position: Option<i64>,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A product image.
#[derive(Debug, Clone, Deserialize)]
pub struct RestImage {
    pub id: u64,
    pub src: String,
    pub position: Option<i64>,
}
