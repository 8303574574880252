//! Order submission workflow.
//!
//! Validation runs entirely before the first write. The header and the lines
//! are written in two steps; if the lines fail, the header is deleted again
//! and the failure is reported as [`CheckoutError::PartialWrite`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{info, instrument};

use wholesale_core::cart::Cart;
use wholesale_core::order::{Order, OrderDraft, OrderItem, SubmissionError};
use wholesale_core::profile::BuyerProfile;
use wholesale_core::{BuyerId, OrderId};

use crate::db::{OrderStore, RepositoryError};

/// Errors from submitting a cart.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart or profile failed validation; nothing was written.
    #[error(transparent)]
    Invalid(#[from] SubmissionError),

    /// Another submission for the same buyer is still running.
    #[error("an order submission is already in progress")]
    InProgress,

    /// The order header could not be written; nothing was persisted.
    #[error("failed to create order: {0}")]
    Header(#[source] RepositoryError),

    /// The header was written but its lines were not.
    #[error(
        "order {order_id} was created without its items (compensated: {compensated}): {source}"
    )]
    PartialWrite {
        order_id: OrderId,
        compensated: bool,
        #[source]
        source: RepositoryError,
    },
}

/// A persisted order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubmittedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Submit a cart as a new pending order.
///
/// On success the caller should replace the buyer's cart with an empty one.
///
/// # Errors
///
/// - [`CheckoutError::Invalid`] before any write
/// - [`CheckoutError::Header`] if the header insert fails (lines are never
///   attempted)
/// - [`CheckoutError::PartialWrite`] if the lines fail after the header
///   succeeded
#[instrument(skip_all, fields(buyer_id = %profile.buyer_id, items = cart.items().len()))]
pub async fn submit_order<S: OrderStore>(
    store: &S,
    cart: &Cart,
    profile: &BuyerProfile,
    notes: Option<String>,
) -> Result<SubmittedOrder, CheckoutError> {
    let draft = OrderDraft::from_cart(cart, profile, notes)?;

    let order = store
        .insert_order(&draft.header)
        .await
        .map_err(CheckoutError::Header)?;

    match store.insert_items(order.id, &draft.items).await {
        Ok(items) => {
            info!(
                order_id = %order.id,
                order_number = order.order_number,
                total = %order.total_price,
                "Order submitted"
            );
            Ok(SubmittedOrder { order, items })
        }
        Err(source) => {
            let compensated = match store.delete_order(order.id).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(
                        order_id = %order.id,
                        error = %e,
                        "Failed to delete order header after item insert failure"
                    );
                    false
                }
            };
            tracing::error!(
                order_id = %order.id,
                order_number = order.order_number,
                compensated,
                error = %source,
                "Order items could not be written"
            );
            Err(CheckoutError::PartialWrite {
                order_id: order.id,
                compensated,
                source,
            })
        }
    }
}

/// Tracks buyers with a submission in flight.
///
/// Cheap to clone; clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    active: Arc<Mutex<HashSet<BuyerId>>>,
}

impl SubmissionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `buyer_id` as submitting.
    ///
    /// The mark is released when the returned permit is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InProgress`] if the buyer already holds a
    /// permit.
    pub fn acquire(&self, buyer_id: BuyerId) -> Result<SubmissionPermit, CheckoutError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(buyer_id) {
            return Err(CheckoutError::InProgress);
        }
        Ok(SubmissionPermit {
            active: Arc::clone(&self.active),
            buyer_id,
        })
    }
}

/// Held for the duration of one submission.
#[derive(Debug)]
pub struct SubmissionPermit {
    active: Arc<Mutex<HashSet<BuyerId>>>,
    buyer_id: BuyerId,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.buyer_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejects_second_submission() {
        let guard = SubmissionGuard::new();
        let buyer = BuyerId::random();

        let permit = guard.acquire(buyer).unwrap();
        assert!(matches!(guard.acquire(buyer), Err(CheckoutError::InProgress)));
        assert!(guard.acquire(BuyerId::random()).is_ok());

        drop(permit);
        assert!(guard.acquire(buyer).is_ok());
    }

    #[test]
    fn test_partial_write_message() {
        let err = CheckoutError::PartialWrite {
            order_id: OrderId::random(),
            compensated: true,
            source: RepositoryError::Conflict("quantity check".to_owned()),
        };
        assert!(err.to_string().contains("compensated: true"));
    }
}
