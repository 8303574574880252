//! Orders, order items and submission drafts.
//!
//! An [`OrderDraft`] is the validated, not-yet-persisted form of a cart
//! submission. Persisted orders carry a copy of the buyer's profile so that
//! documents can be regenerated from stored fields alone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{Cart, CartItem, MinimumOrderStatus};
use crate::profile::{BuyerProfile, ProfileError};
use crate::types::{BuyerId, OrderId, OrderItemId, OrderStatus};

/// A submitted order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Sequential, human-facing order number.
    pub order_number: i64,
    pub status: OrderStatus,
    /// Sum of line totals, excluding tax.
    pub total_price: Decimal,
    pub buyer_id: BuyerId,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_postal_code: Option<String>,
    pub shipping_country: Option<String>,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted order line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_title: String,
    pub variant_title: Option<String>,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub total_price: Decimal,
    pub image_url: Option<String>,
}

/// Order header fields supplied on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer_id: BuyerId,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_postal_code: Option<String>,
    pub shipping_country: Option<String>,
    pub notes: Option<String>,
}

/// Order line fields supplied on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_title: String,
    pub variant_title: Option<String>,
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub image_url: Option<String>,
}

impl From<&CartItem> for NewOrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_title: item.product.title.clone(),
            variant_title: Some(item.variant.title.clone()),
            sku: item.variant.sku.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.amount,
            total_price: item.line_total(),
            image_url: item.product.image_url.clone(),
        }
    }
}

/// Reasons a cart cannot be submitted. Checked before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("{message}")]
    BelowMinimum {
        status: MinimumOrderStatus,
        message: String,
    },

    #[error("profile incomplete: {0}")]
    IncompleteProfile(#[from] ProfileError),
}

/// Check the cart-only submission rules: not empty, minimum order value met.
///
/// # Errors
///
/// Returns [`SubmissionError::EmptyCart`] or [`SubmissionError::BelowMinimum`].
pub fn validate_cart(cart: &Cart) -> Result<(), SubmissionError> {
    if cart.is_empty() {
        return Err(SubmissionError::EmptyCart);
    }
    let status = cart.minimum_order_status();
    if let Some(message) = status.message() {
        return Err(SubmissionError::BelowMinimum { status, message });
    }
    Ok(())
}

/// A validated order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub header: NewOrder,
    pub items: Vec<NewOrderItem>,
}

impl OrderDraft {
    /// Validate a cart and snapshot the buyer profile into a draft.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if the cart is empty, below the minimum
    /// order value, or the profile lacks required fields.
    pub fn from_cart(
        cart: &Cart,
        profile: &BuyerProfile,
        notes: Option<String>,
    ) -> Result<Self, SubmissionError> {
        validate_cart(cart)?;
        profile.ensure_orderable()?;

        let header = NewOrder {
            buyer_id: profile.buyer_id,
            status: OrderStatus::Pending,
            total_price: cart.total_price(),
            company_name: profile.company_name.clone(),
            contact_name: profile.contact_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            shipping_address: profile.address.clone(),
            shipping_city: profile.city.clone(),
            shipping_postal_code: profile.postal_code.clone(),
            shipping_country: Some(profile.country.clone()),
            notes: notes
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
        };
        let items = cart.items().iter().map(NewOrderItem::from).collect();

        Ok(Self { header, items })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::tests::item;

    fn profile() -> BuyerProfile {
        let mut p = BuyerProfile::blank(BuyerId::random(), "inkoop@schoenhandel.nl");
        p.company_name = "Schoenhandel B.V.".to_owned();
        p.contact_name = "Sam de Vries".to_owned();
        p.city = Some("Utrecht".to_owned());
        p
    }

    #[test]
    fn test_draft_from_valid_cart() {
        let cart = Cart::new()
            .add_item(item(41, "65.00", 2))
            .add_item(item(42, "65.00", 2));
        let draft = OrderDraft::from_cart(&cart, &profile(), Some("  Leveren na 1 mei ".into()))
            .unwrap();

        assert_eq!(draft.header.total_price, Decimal::from(260));
        assert_eq!(draft.header.status, OrderStatus::Pending);
        assert_eq!(draft.header.shipping_city.as_deref(), Some("Utrecht"));
        assert_eq!(draft.header.notes.as_deref(), Some("Leveren na 1 mei"));
        assert_eq!(draft.items.len(), 2);
        assert!(
            draft
                .items
                .iter()
                .all(|i| i.total_price == i.unit_price * Decimal::from(i.quantity))
        );
    }

    #[test]
    fn test_draft_rejects_empty_cart() {
        let err = OrderDraft::from_cart(&Cart::new(), &profile(), None).unwrap_err();
        assert_eq!(err, SubmissionError::EmptyCart);
    }

    #[test]
    fn test_draft_rejects_below_minimum() {
        let cart = Cart::new().add_item(item(42, "100.00", 1));
        let err = OrderDraft::from_cart(&cart, &profile(), None).unwrap_err();
        match err {
            SubmissionError::BelowMinimum { status, message } => {
                assert_eq!(status.shortfall, Decimal::from(150));
                assert_eq!(message, "Nog €150.00 nodig (minimum €250.00)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_draft_rejects_incomplete_profile() {
        let cart = Cart::new().add_item(item(42, "300.00", 1));
        let blank = BuyerProfile::blank(BuyerId::random(), "a@b.nl");
        assert!(matches!(
            OrderDraft::from_cart(&cart, &blank, None),
            Err(SubmissionError::IncompleteProfile(_))
        ));
    }
}
