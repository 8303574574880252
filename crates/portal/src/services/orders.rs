//! Order lookup, status changes and document rendering.

use thiserror::Error;
use tracing::{info, instrument};

use wholesale_core::document::{DocumentKind, OrderDocument, SellerDetails, render_document};
use wholesale_core::order::{Order, OrderItem};
use wholesale_core::{BuyerId, OrderId, OrderStatus};

use crate::db::{OrderStore, RepositoryError};

/// Errors from order services.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The order does not exist, or belongs to someone else.
    #[error("order {0} not found")]
    NotFound(OrderId),

    #[error("cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}

/// An order header with its lines.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Load an order and its lines.
///
/// With `owner` set, orders of other buyers are reported as not found.
///
/// # Errors
///
/// Returns [`OrderServiceError::NotFound`] if the order is missing or not
/// owned by `owner`.
pub async fn load_order<S: OrderStore>(
    store: &S,
    order_id: OrderId,
    owner: Option<BuyerId>,
) -> Result<OrderWithItems, OrderServiceError> {
    let order = store
        .get_order(order_id)
        .await?
        .filter(|o| owner.is_none_or(|buyer| o.buyer_id == buyer))
        .ok_or(OrderServiceError::NotFound(order_id))?;
    let items = store.get_items(order_id).await?;
    Ok(OrderWithItems { order, items })
}

/// Move an order to `next`, following the fulfillment lifecycle.
///
/// Re-setting the current status succeeds without writing.
///
/// # Errors
///
/// - [`OrderServiceError::NotFound`] if the order does not exist
/// - [`OrderServiceError::IllegalTransition`] if the lifecycle forbids the
///   move
/// - [`RepositoryError::Conflict`] if the order changed concurrently
#[instrument(skip(store))]
pub async fn change_status<S: OrderStore>(
    store: &S,
    order_id: OrderId,
    next: OrderStatus,
) -> Result<Order, OrderServiceError> {
    let order = store
        .get_order(order_id)
        .await?
        .ok_or(OrderServiceError::NotFound(order_id))?;

    if !order.status.can_transition_to(next) {
        return Err(OrderServiceError::IllegalTransition {
            from: order.status,
            to: next,
        });
    }
    if order.status == next {
        return Ok(order);
    }

    let updated = store
        .update_status(order_id, order.status, next)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => OrderServiceError::NotFound(order_id),
            other => other.into(),
        })?;
    info!(from = %order.status, to = %next, "Order status changed");
    Ok(updated)
}

/// Render a confirmation or invoice for an order.
///
/// # Errors
///
/// Returns [`OrderServiceError::NotFound`] if the order does not exist.
pub async fn render_order_document<S: OrderStore>(
    store: &S,
    order_id: OrderId,
    kind: DocumentKind,
    seller: &SellerDetails,
) -> Result<OrderDocument, OrderServiceError> {
    let OrderWithItems { order, items } = load_order(store, order_id, None).await?;
    Ok(render_document(kind, &order, &items, seller))
}
