//! Catalog route.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use wholesale_core::catalog::Product;
use wholesale_core::inventory::{Reconciler, VariantStock};

use crate::error::Result;
use crate::middleware::{RequireBuyer, load_cart};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Only products of this type (case-insensitive).
    pub product_type: Option<String>,
    /// Free-text search on product title and variant SKU (case-insensitive).
    pub q: Option<String>,
}

impl CatalogQuery {
    fn matches(&self, product: &Product) -> bool {
        let type_ok = self.product_type.as_deref().is_none_or(|wanted| {
            product
                .product_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case(wanted))
        });
        let search = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let search_ok = search.is_none_or(|needle| {
            product.title.to_lowercase().contains(&needle)
                || product.variants.iter().any(|v| {
                    v.sku
                        .as_deref()
                        .is_some_and(|sku| sku.to_lowercase().contains(&needle))
                })
        });
        type_ok && search_ok
    }
}

/// A product with orderability for each of its variants.
#[derive(Debug, Serialize)]
pub struct CatalogProduct {
    #[serde(flatten)]
    pub product: Product,
    pub stock: Vec<VariantStock>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<CatalogProduct>,
    /// False when stock could not be fetched and limits are fallbacks.
    pub stock_known: bool,
}

/// List the catalog with stock limits relative to the buyer's cart.
///
/// GET /api/catalog?product_type=Sneakers&q=runner
#[instrument(skip_all, fields(user_id = %buyer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let shopify = state.shopify();
    let (catalog, stock) = tokio::join!(shopify.fetch_catalog(), shopify.stock_or_empty());
    let catalog = catalog?;
    let cart = load_cart(&session).await?;
    let reconciler = Reconciler::new(&stock, &cart);

    let products = catalog
        .iter()
        .filter(|p| query.matches(p))
        .map(|p| CatalogProduct {
            stock: p.variants.iter().map(|v| reconciler.variant_stock(v)).collect(),
            product: p.clone(),
        })
        .collect();

    Ok(Json(CatalogResponse {
        products,
        stock_known: !stock.is_empty(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wholesale_core::catalog::Variant;
    use wholesale_core::{Price, ProductId, VariantId};

    fn product(title: &str, product_type: &str, sku: &str) -> Product {
        Product {
            id: ProductId::from_numeric(1),
            title: title.to_owned(),
            handle: title.to_lowercase().replace(' ', "-"),
            product_type: Some(product_type.to_owned()),
            vendor: None,
            image_url: None,
            variants: vec![Variant {
                id: VariantId::from_numeric(101),
                title: "41 / Black".to_owned(),
                sku: Some(sku.to_owned()),
                selected_options: Vec::new(),
                price: Price::eur(rust_decimal::Decimal::from(65)),
                compare_at_price: None,
                available: true,
                quantity_available: None,
                image_url: None,
            }],
        }
    }

    fn query(product_type: Option<&str>, q: Option<&str>) -> CatalogQuery {
        CatalogQuery {
            product_type: product_type.map(str::to_owned),
            q: q.map(str::to_owned),
        }
    }

    #[test]
    fn test_search_matches_title_and_sku() {
        let runner = product("Runner X", "Sneakers", "STR-RX-BLK");
        assert!(query(None, Some("runner")).matches(&runner));
        assert!(query(None, Some("rx-blk")).matches(&runner));
        assert!(!query(None, Some("trail")).matches(&runner));
        assert!(query(None, Some("   ")).matches(&runner));
    }

    #[test]
    fn test_type_and_search_combine() {
        let runner = product("Runner X", "Sneakers", "STR-RX-BLK");
        assert!(query(Some("sneakers"), Some("Runner")).matches(&runner));
        assert!(!query(Some("Boots"), Some("Runner")).matches(&runner));
        assert!(query(None, None).matches(&runner));
    }
}
