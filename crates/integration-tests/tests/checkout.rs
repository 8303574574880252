//! Integration tests for the order submission workflow and order services.
//!
//! Run against [`MemoryOrderStore`] so header/item write failures can be
//! injected.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use wholesale_core::cart::{Cart, CartItem};
use wholesale_core::catalog::find_variant;
use wholesale_core::order::SubmissionError;
use wholesale_core::profile::ProfileError;
use wholesale_core::{BuyerId, OrderStatus};
use wholesale_integration_tests::{MemoryOrderStore, catalog, dec, profile, variant_id};
use wholesale_portal::db::OrderStore;
use wholesale_portal::services::{
    CheckoutError, OrderServiceError, change_status, load_order, submit_order,
};

fn cart_with(lines: &[(u64, u64, u32)]) -> Cart {
    let products = catalog();
    lines.iter().fold(Cart::new(), |cart, &(product, size, qty)| {
        let (p, v) = find_variant(&products, &variant_id(product, size)).unwrap();
        cart.add_item(CartItem::from_catalog(p, v, qty))
    })
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_submit_order_at_260() {
    let store = MemoryOrderStore::default();
    let buyer = BuyerId::random();
    // 4 x 65.00 = 260.00
    let cart = cart_with(&[(1, 41, 2), (1, 42, 2)]);

    let submitted = submit_order(&store, &cart, &profile(buyer), Some(" Graag voor 1 mei ".into()))
        .await
        .unwrap();

    assert_eq!(submitted.order.status, OrderStatus::Pending);
    assert_eq!(submitted.order.total_price, dec("260.00"));
    assert_eq!(submitted.order.buyer_id, buyer);
    assert_eq!(submitted.order.company_name, "Schoenhandel De Vries B.V.");
    assert_eq!(submitted.order.shipping_city.as_deref(), Some("Utrecht"));
    assert_eq!(submitted.order.shipping_country.as_deref(), Some("NL"));
    assert_eq!(submitted.order.notes.as_deref(), Some("Graag voor 1 mei"));

    assert_eq!(submitted.items.len(), 2);
    let line_sum: rust_decimal::Decimal = submitted.items.iter().map(|i| i.total_price).sum();
    assert_eq!(line_sum, submitted.order.total_price);
    assert!(submitted
        .items
        .iter()
        .all(|i| i.total_price == i.unit_price * rust_decimal::Decimal::from(i.quantity)));

    assert_eq!(store.order_count(), 1);
    assert_eq!(store.item_count(), 2);
}

/// A cart line for a fixture variant at an overridden unit price.
fn priced_line(product: u64, size: u64, price: &str, qty: u32) -> CartItem {
    let products = catalog();
    let (p, v) = find_variant(&products, &variant_id(product, size)).unwrap();
    let mut variant = v.clone();
    variant.price = wholesale_core::Price::eur(dec(price));
    CartItem::from_catalog(p, &variant, qty)
}

#[tokio::test]
async fn test_minimum_order_sequence() {
    let store = MemoryOrderStore::default();
    let buyer = profile(BuyerId::random());

    // 100 x 1 + 80 x 2 = 260
    let cart = Cart::new()
        .add_item(priced_line(1, 41, "100.00", 1))
        .add_item(priced_line(2, 44, "80.00", 2));
    assert_eq!(cart.total_price(), dec("260.00"));
    assert!(cart.minimum_order_status().met);
    let submitted = submit_order(&store, &cart, &buyer, None).await.unwrap();
    assert_eq!(submitted.order.total_price, dec("260.00"));

    // Dropping the second line leaves 100
    let cart = cart.remove_item(&variant_id(2, 44));
    assert_eq!(cart.total_price(), dec("100.00"));
    let err = submit_order(&store, &cart, &buyer, None).await.unwrap_err();
    match err {
        CheckoutError::Invalid(SubmissionError::BelowMinimum { status, message }) => {
            assert_eq!(status.shortfall, dec("150.00"));
            assert_eq!(message, "Nog €150.00 nodig (minimum €250.00)");
        }
        other => panic!("expected BelowMinimum, got {other:?}"),
    }
    assert_eq!(store.order_count(), 1);
}

#[tokio::test]
async fn test_below_minimum_writes_nothing() {
    let store = MemoryOrderStore::default();
    // 2 x 52.00 = 104.00
    let cart = cart_with(&[(2, 44, 2)]);

    let err = submit_order(&store, &cart, &profile(BuyerId::random()), None)
        .await
        .unwrap_err();

    match err {
        CheckoutError::Invalid(SubmissionError::BelowMinimum { status, message }) => {
            assert_eq!(status.shortfall, dec("146.00"));
            assert_eq!(message, "Nog €146.00 nodig (minimum €250.00)");
        }
        other => panic!("expected BelowMinimum, got {other:?}"),
    }
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.item_insert_attempts(), 0);
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let store = MemoryOrderStore::default();
    let err = submit_order(&store, &Cart::new(), &profile(BuyerId::random()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Invalid(SubmissionError::EmptyCart)));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_incomplete_profile_is_rejected() {
    let store = MemoryOrderStore::default();
    let mut incomplete = profile(BuyerId::random());
    incomplete.company_name = "  ".to_owned();

    let err = submit_order(&store, &cart_with(&[(1, 41, 4)]), &incomplete, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Invalid(SubmissionError::IncompleteProfile(
            ProfileError::MissingField("company_name")
        ))
    ));
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_header_failure_skips_items() {
    let store = MemoryOrderStore::default();
    store.fail_header.store(true, Ordering::SeqCst);

    let err = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(BuyerId::random()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Header(_)));
    assert_eq!(store.item_insert_attempts(), 0);
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_item_failure_deletes_header() {
    let store = MemoryOrderStore::default();
    store.fail_items.store(true, Ordering::SeqCst);

    let err = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(BuyerId::random()), None)
        .await
        .unwrap_err();

    match err {
        CheckoutError::PartialWrite { compensated, .. } => assert!(compensated),
        other => panic!("expected PartialWrite, got {other:?}"),
    }
    assert_eq!(store.item_insert_attempts(), 1);
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn test_failed_compensation_is_reported() {
    let store = MemoryOrderStore::default();
    store.fail_items.store(true, Ordering::SeqCst);
    store.fail_delete.store(true, Ordering::SeqCst);

    let err = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(BuyerId::random()), None)
        .await
        .unwrap_err();

    let CheckoutError::PartialWrite { order_id, compensated, .. } = err else {
        panic!("expected PartialWrite");
    };
    assert!(!compensated);
    // The orphaned header is still there for staff to clean up
    assert!(store.get_order(order_id).await.unwrap().is_some());
}

// =============================================================================
// Order services
// =============================================================================

#[tokio::test]
async fn test_order_lifecycle() {
    let store = MemoryOrderStore::default();
    let submitted = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(BuyerId::random()), None)
        .await
        .unwrap();
    let id = submitted.order.id;

    for next in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
        let order = change_status(&store, id, next).await.unwrap();
        assert_eq!(order.status, next);
    }

    let err = change_status(&store, id, OrderStatus::Cancelled).await.unwrap_err();
    assert!(matches!(
        err,
        OrderServiceError::IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Cancelled
        }
    ));
}

#[tokio::test]
async fn test_status_cannot_skip_steps() {
    let store = MemoryOrderStore::default();
    let submitted = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(BuyerId::random()), None)
        .await
        .unwrap();

    let err = change_status(&store, submitted.order.id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderServiceError::IllegalTransition { .. }));

    let cancelled = change_status(&store, submitted.order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_load_order_hides_other_buyers() {
    let store = MemoryOrderStore::default();
    let owner = BuyerId::random();
    let submitted = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(owner), None)
        .await
        .unwrap();
    let id = submitted.order.id;

    let loaded = load_order(&store, id, Some(owner)).await.unwrap();
    assert_eq!(loaded.items.len(), 1);

    let err = load_order(&store, id, Some(BuyerId::random())).await.unwrap_err();
    assert!(matches!(err, OrderServiceError::NotFound(_)));

    assert!(load_order(&store, id, None).await.is_ok());
}

#[tokio::test]
async fn test_list_orders_by_buyer() {
    let store = MemoryOrderStore::default();
    let a = BuyerId::random();
    let b = BuyerId::random();
    for buyer in [a, a, b] {
        submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(buyer), None)
            .await
            .unwrap();
    }

    let mine = store.list_orders(Some(a)).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.first().unwrap().order_number > mine.last().unwrap().order_number);
    assert_eq!(store.list_orders(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_status_change_reads_current_status() {
    let store = MemoryOrderStore::default();
    let submitted = submit_order(&store, &cart_with(&[(1, 41, 4)]), &profile(BuyerId::random()), None)
        .await
        .unwrap();
    let id = submitted.order.id;

    // Another staff member shipped it in the meantime
    store.force_status(id, OrderStatus::Shipped);

    let err = change_status(&store, id, OrderStatus::Confirmed).await.unwrap_err();
    assert!(matches!(
        err,
        OrderServiceError::IllegalTransition {
            from: OrderStatus::Shipped,
            ..
        }
    ));
    let delivered = change_status(&store, id, OrderStatus::Delivered).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    // Same status is a no-op
    let again = change_status(&store, id, OrderStatus::Delivered).await.unwrap();
    assert_eq!(again.status, OrderStatus::Delivered);
}
