//! Checkout route.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use wholesale_core::cart::Cart;
use wholesale_core::order::validate_cart;
use wholesale_core::profile::BuyerProfile;

use crate::db::{OrderRepository, ProfileRepository};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireBuyer, load_cart, store_cart};
use crate::services::{CheckoutError, SubmittedOrder, submit_order};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Submit the cart as a pending order and empty the cart.
///
/// POST /api/checkout
#[instrument(skip_all, fields(user_id = %buyer.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<SubmittedOrder>)> {
    let _permit = state.submissions().acquire(buyer.id)?;

    let cart = load_cart(&session).await?;
    validate_cart(&cart).map_err(CheckoutError::from)?;

    let profile = ProfileRepository::new(state.pool())
        .get(buyer.id)
        .await?
        .unwrap_or_else(|| BuyerProfile::blank(buyer.id, buyer.email.clone()));

    let store = OrderRepository::new(state.pool());
    let submitted = submit_order(&store, &cart, &profile, request.notes).await?;

    store_cart(&session, &Cart::new()).await?;
    let order_id = submitted.order.id.to_string();
    add_breadcrumb("checkout", "Order submitted", Some(&[("order_id", order_id.as_str())]));

    Ok((StatusCode::CREATED, Json(submitted)))
}
