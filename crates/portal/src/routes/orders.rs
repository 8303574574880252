//! Buyer order history routes.

use axum::{
    Json,
    extract::{Path, State},
};

use wholesale_core::OrderId;
use wholesale_core::order::Order;

use crate::db::{OrderRepository, OrderStore};
use crate::error::Result;
use crate::middleware::RequireBuyer;
use crate::services::{OrderWithItems, load_order};
use crate::state::AppState;

/// The buyer's orders, newest first.
///
/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_orders(Some(buyer.id))
        .await?;
    Ok(Json(orders))
}

/// One of the buyer's orders with its lines.
///
/// GET /api/orders/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireBuyer(buyer): RequireBuyer,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let store = OrderRepository::new(state.pool());
    Ok(Json(load_order(&store, id, Some(buyer.id)).await?))
}
