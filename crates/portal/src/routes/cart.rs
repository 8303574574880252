//! Cart route handlers.
//!
//! The cart lives in the buyer's session as a [`Cart`] snapshot. Every
//! mutation loads it, applies one pure operation and stores the result.
//! Quantities are clamped against current stock before they reach the cart.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, instrument};

use wholesale_core::VariantId;
use wholesale_core::cart::{Cart, CartItem, MinimumOrderStatus};
use wholesale_core::catalog::find_variant;
use wholesale_core::inventory::Reconciler;
use wholesale_core::{Price, format_amount};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireBuyer, load_cart, store_cart};
use crate::state::AppState;

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u64,
    pub total_price: Price,
    pub minimum_order: MinimumOrderStatus,
    /// Present while the minimum order value is not met.
    pub shortfall_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    line_total: format_amount(item.line_total()),
                    item: item.clone(),
                })
                .collect(),
            total_items: cart.total_items(),
            total_price: Price::eur(cart.total_price()),
            minimum_order: cart.minimum_order_status(),
            shortfall_message: cart.shortfall_message(),
        }
    }
}

/// Result of a quantity change that may have been clamped.
#[derive(Debug, Serialize)]
pub struct CartMutation {
    pub cart: CartView,
    pub requested: i64,
    /// Quantity actually applied (added, or set) after stock limits.
    pub applied: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Accept either a full variant GID (percent-encoded in the path) or its
/// numeric tail.
fn variant_id_from_path(raw: &str) -> VariantId {
    raw.parse::<u64>()
        .map_or_else(|_| VariantId::new(raw), VariantId::from_numeric)
}

/// Show the cart.
///
/// GET /api/cart
pub async fn show(RequireBuyer(_buyer): RequireBuyer, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a variant to the cart, merging with an existing line.
///
/// POST /api/cart/items
#[instrument(skip_all, fields(user_id = %buyer.id, variant_id = %request.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartMutation>> {
    if request.quantity <= 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }

    let shopify = state.shopify();
    let (catalog, stock) = tokio::join!(shopify.fetch_catalog(), shopify.stock_or_empty());
    let catalog = catalog?;
    let (product, variant) = find_variant(&catalog, &request.variant_id)
        .ok_or_else(|| AppError::NotFound(format!("Variant {}", request.variant_id)))?;

    let cart = load_cart(&session).await?;
    let applied = Reconciler::new(&stock, &cart).clamp_add(variant, request.quantity);
    if applied == 0 {
        let reason = if variant.available {
            "No more stock available for this size"
        } else {
            "This size is not available"
        };
        return Err(AppError::Unprocessable(reason.to_string()));
    }
    if i64::from(applied) < request.quantity {
        debug!(requested = request.quantity, applied, "Add clamped to stock");
    }

    let cart = cart.add_item(CartItem::from_catalog(product, variant, applied));
    store_cart(&session, &cart).await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("variant_id", variant.id.as_str())]),
    );

    Ok(Json(CartMutation {
        cart: CartView::from(&cart),
        requested: request.quantity,
        applied,
    }))
}

/// Set the quantity of a cart line. Zero or less removes it.
///
/// PUT /api/cart/items/{variant_id}
#[instrument(skip_all, fields(user_id = %buyer.id, variant_id = %raw_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    session: Session,
    Path(raw_id): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartMutation>> {
    let variant_id = variant_id_from_path(&raw_id);
    let cart = load_cart(&session).await?;
    if cart.get(&variant_id).is_none() {
        return Err(AppError::NotFound(format!("Cart item {variant_id}")));
    }

    let applied = if request.quantity <= i64::from(cart.quantity_of(&variant_id)) {
        // Lowering never needs stock
        u32::try_from(request.quantity.max(0)).unwrap_or(0)
    } else {
        let shopify = state.shopify();
        let (catalog, stock) = tokio::join!(shopify.fetch_catalog(), shopify.stock_or_empty());
        let catalog = catalog?;
        let (_, variant) = find_variant(&catalog, &variant_id)
            .ok_or_else(|| AppError::NotFound(format!("Variant {variant_id}")))?;
        Reconciler::new(&stock, &cart).clamp_set(variant, request.quantity)
    };

    let cart = cart.update_quantity(&variant_id, i64::from(applied));
    store_cart(&session, &cart).await?;

    Ok(Json(CartMutation {
        cart: CartView::from(&cart),
        requested: request.quantity,
        applied,
    }))
}

/// Remove a cart line.
///
/// DELETE /api/cart/items/{variant_id}
pub async fn remove(
    RequireBuyer(_buyer): RequireBuyer,
    session: Session,
    Path(raw_id): Path<String>,
) -> Result<Json<CartView>> {
    let variant_id = variant_id_from_path(&raw_id);
    let cart = load_cart(&session).await?.remove_item(&variant_id);
    store_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
///
/// DELETE /api/cart
pub async fn clear(RequireBuyer(_buyer): RequireBuyer, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?.clear();
    store_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}
