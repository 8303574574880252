//! Conversions from Admin REST payloads into core catalog types.

use wholesale_core::catalog::{Product, SelectedOption, Variant};
use wholesale_core::inventory::StockSnapshot;
use wholesale_core::{CurrencyCode, Price, PriceError, ProductId, VariantId};

use super::ShopifyError;
use super::types::{RestProduct, RestVariant};

/// Convert a REST product into a catalog product.
///
/// # Errors
///
/// Returns `ShopifyError::Parse` if a variant carries a malformed price.
pub fn convert_product(product: RestProduct) -> Result<Product, ShopifyError> {
    let image_url = product
        .image
        .as_ref()
        .or_else(|| product.images.first())
        .map(|img| img.src.clone());

    let variants = product
        .variants
        .iter()
        .map(|v| convert_variant(&product, v))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        id: ProductId::from_numeric(product.id),
        title: product.title,
        handle: product.handle,
        product_type: product.product_type.filter(|t| !t.is_empty()),
        vendor: product.vendor.filter(|v| !v.is_empty()),
        image_url,
        variants,
    })
}

fn convert_variant(product: &RestProduct, variant: &RestVariant) -> Result<Variant, ShopifyError> {
    let price = parse_price(variant.price.as_deref().unwrap_or("0"), variant.id)?;
    let compare_at_price = variant
        .compare_at_price
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(|p| parse_price(p, variant.id))
        .transpose()?;

    let quantity_available = variant
        .stock_limited()
        .then(|| variant.inventory_quantity.unwrap_or(0));
    let available = !variant.stock_limited() || quantity_available.is_some_and(|q| q > 0);

    let image_url = variant.image_id.and_then(|image_id| {
        product
            .images
            .iter()
            .find(|img| img.id == image_id)
            .map(|img| img.src.clone())
    });

    Ok(Variant {
        id: VariantId::from_numeric(variant.id),
        title: variant.title.clone(),
        sku: variant.sku.clone().filter(|s| !s.is_empty()),
        selected_options: selected_options(product, variant),
        price,
        compare_at_price,
        available,
        quantity_available,
        image_url,
    })
}

/// Pair `option1..option3` with the product's option names.
fn selected_options(product: &RestProduct, variant: &RestVariant) -> Vec<SelectedOption> {
    let values = [&variant.option1, &variant.option2, &variant.option3];
    product
        .options
        .iter()
        .zip(values)
        .filter_map(|(option, value)| {
            value.as_ref().map(|value| SelectedOption {
                name: option.name.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

fn parse_price(amount: &str, variant_id: u64) -> Result<Price, ShopifyError> {
    Price::parse(amount, CurrencyCode::EUR).map_err(|e: PriceError| {
        ShopifyError::Parse(format!("variant {variant_id}: {e}"))
    })
}

/// Add the stock levels of a page of products to a snapshot.
///
/// Only stock-limited variants are recorded; untracked and oversellable
/// variants stay unknown. A tracked variant without a quantity counts as 0.
pub fn collect_stock(snapshot: &mut StockSnapshot, products: &[RestProduct]) {
    for variant in products.iter().flat_map(|p| p.variants.iter()) {
        if variant.stock_limited() {
            snapshot.insert(
                VariantId::from_numeric(variant.id),
                variant.inventory_quantity.unwrap_or(0),
            );
        }
    }
}
