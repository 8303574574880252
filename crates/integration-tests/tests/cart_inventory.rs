//! Cart and inventory behaviour across longer operation sequences.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use rust_decimal::Decimal;

use wholesale_core::cart::{Cart, CartItem};
use wholesale_core::catalog::find_variant;
use wholesale_core::inventory::{Reconciler, StockLevel, StockSnapshot, UNKNOWN_STOCK_CAP};
use wholesale_integration_tests::{catalog, variant_id};

fn snapshot() -> StockSnapshot {
    [(variant_id(1, 41), 10), (variant_id(1, 42), 3), (variant_id(1, 43), 0)]
        .into_iter()
        .collect()
}

fn assert_cart_invariants(cart: &Cart) {
    let ids: HashSet<_> = cart.items().iter().map(|i| i.variant_id.clone()).collect();
    assert_eq!(ids.len(), cart.items().len(), "duplicate variant in cart");
    assert!(cart.items().iter().all(|i| i.quantity >= 1));

    let expected: Decimal = cart
        .items()
        .iter()
        .map(|i| i.unit_price.amount * Decimal::from(i.quantity))
        .sum();
    assert_eq!(cart.total_price(), expected);
    assert_eq!(
        cart.total_items(),
        cart.items().iter().map(|i| u64::from(i.quantity)).sum::<u64>()
    );
}

#[test]
fn test_operation_sequence_keeps_invariants() {
    let products = catalog();
    let ids = [
        variant_id(1, 41),
        variant_id(1, 42),
        variant_id(1, 43),
        variant_id(2, 44),
    ];

    // Deterministic linear congruential sequence
    let mut seed: u64 = 0x2545_F491;
    let mut next = move || {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        seed >> 33
    };

    let mut cart = Cart::new();
    for _ in 0..500 {
        let id = ids.get(usize::try_from(next() % 4).unwrap()).unwrap();
        let (product, variant) = find_variant(&products, id).unwrap();
        let amount = i64::try_from(next() % 7).unwrap() - 2;
        cart = match next() % 4 {
            0 | 1 => cart.add_item(CartItem::from_catalog(
                product,
                variant,
                u32::try_from(amount.max(0)).unwrap(),
            )),
            2 => cart.update_quantity(id, amount),
            _ => cart.remove_item(id),
        };
        assert_cart_invariants(&cart);
    }
}

#[test]
fn test_stock_cap_accounts_for_cart() {
    let products = catalog();
    let stock = snapshot();
    let (product, v41) = find_variant(&products, &variant_id(1, 41)).unwrap();

    let cart = Cart::new().add_item(CartItem::from_catalog(product, v41, 4));
    let reconciler = Reconciler::new(&stock, &cart);

    assert_eq!(reconciler.variant_stock(v41).max_additional, 6);
    assert_eq!(reconciler.clamp_add(v41, 7), 6);
    assert_eq!(reconciler.clamp_add(v41, 2), 2);
    // Setting the line exactly is capped at stock, lowering always works
    assert_eq!(reconciler.clamp_set(v41, 25), 10);
    assert_eq!(reconciler.clamp_set(v41, 1), 1);
}

#[test]
fn test_repeated_adds_never_exceed_stock() {
    let products = catalog();
    let stock = snapshot();
    let (product, v42) = find_variant(&products, &variant_id(1, 42)).unwrap();

    let mut cart = Cart::new();
    for _ in 0..5 {
        let applied = Reconciler::new(&stock, &cart).clamp_add(v42, 2);
        if applied > 0 {
            cart = cart.add_item(CartItem::from_catalog(product, v42, applied));
        }
    }
    assert_eq!(cart.quantity_of(&v42.id), 3);
}

#[test]
fn test_unknown_and_unavailable_variants() {
    let products = catalog();
    let stock = snapshot();
    let cart = Cart::new();
    let reconciler = Reconciler::new(&stock, &cart);

    let (_, v44) = find_variant(&products, &variant_id(2, 44)).unwrap();
    let untracked = reconciler.variant_stock(v44);
    assert_eq!(untracked.stock, StockLevel::Unknown);
    assert_eq!(untracked.max_additional, UNKNOWN_STOCK_CAP);

    let (_, v43) = find_variant(&products, &variant_id(1, 43)).unwrap();
    assert_eq!(reconciler.clamp_add(v43, 1), 0);
}

#[test]
fn test_empty_snapshot_never_blocks() {
    let products = catalog();
    let stock = StockSnapshot::empty();
    let cart = Cart::new();
    let reconciler = Reconciler::new(&stock, &cart);

    let stocks = reconciler.catalog_stock(&products);
    assert_eq!(stocks.len(), 4);
    for entry in stocks.iter().filter(|s| s.available) {
        assert_eq!(entry.stock, StockLevel::Unknown);
        assert!(entry.max_additional > 0);
    }
}

#[test]
fn test_minimum_order_threshold() {
    let products = catalog();
    let (product, v41) = find_variant(&products, &variant_id(1, 41)).unwrap();

    let cart = Cart::new().add_item(CartItem::from_catalog(product, v41, 3));
    assert_eq!(
        cart.shortfall_message().as_deref(),
        Some("Nog €55.00 nodig (minimum €250.00)")
    );

    let cart = cart.add_item(CartItem::from_catalog(product, v41, 1));
    assert!(cart.minimum_order_status().met);
    assert_eq!(cart.shortfall_message(), None);
}

#[test]
fn test_normalized_size_is_exposed() {
    let products = catalog();
    let (product, v42) = find_variant(&products, &variant_id(1, 42)).unwrap();

    let cart = Cart::new().add_item(CartItem::from_catalog(product, v42, 1));
    let line = cart.items().first().unwrap();
    assert_eq!(line.variant.size.as_deref(), Some("42"));

    let stock = snapshot();
    let sizes: Vec<_> = Reconciler::new(&stock, &cart)
        .catalog_stock(&products)
        .into_iter()
        .map(|s| s.size)
        .collect();
    assert_eq!(
        sizes,
        ["41", "42", "43", "44"].map(|s| Some(s.to_owned())).to_vec()
    );
}
