//! Shared fixtures for the wholesale portal integration tests.
//!
//! [`MemoryOrderStore`] implements the portal's `OrderStore` in memory, with
//! switches to make individual writes fail, so the checkout workflow can be
//! exercised without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p wholesale-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use wholesale_core::catalog::{Product, SelectedOption, Variant};
use wholesale_core::order::{NewOrder, NewOrderItem, Order, OrderItem};
use wholesale_core::profile::BuyerProfile;
use wholesale_core::{
    BuyerId, CurrencyCode, OrderId, OrderItemId, OrderStatus, Price, ProductId, VariantId,
};
use wholesale_portal::db::{OrderStore, RepositoryError};

#[derive(Default)]
struct Tables {
    orders: Vec<Order>,
    items: HashMap<OrderId, Vec<OrderItem>>,
    next_number: i64,
}

/// In-memory [`OrderStore`] with failure injection.
pub struct MemoryOrderStore {
    tables: Mutex<Tables>,
    now: DateTime<Utc>,
    pub fail_header: AtomicBool,
    pub fail_items: AtomicBool,
    pub fail_delete: AtomicBool,
    item_inserts: AtomicUsize,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl MemoryOrderStore {
    /// A store whose orders are all created at `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_number: 1,
                ..Tables::default()
            }),
            now,
            fail_header: AtomicBool::new(false),
            fail_items: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            item_inserts: AtomicUsize::new(0),
        }
    }

    /// Continue numbering from `next` (e.g. to test padding).
    #[must_use]
    pub fn starting_at(self, next: i64) -> Self {
        self.tables().next_number = next;
        self
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.tables().orders.len()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.tables().items.values().map(Vec::len).sum()
    }

    /// How often `insert_items` was called, failed calls included.
    #[must_use]
    pub fn item_insert_attempts(&self) -> usize {
        self.item_inserts.load(Ordering::SeqCst)
    }

    /// Overwrite a stored status behind the services' back.
    pub fn force_status(&self, order_id: OrderId, status: OrderStatus) {
        if let Some(order) = self.tables().orders.iter_mut().find(|o| o.id == order_id) {
            order.status = status;
        }
    }
}

fn injected(what: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("injected {what} failure"))
}

impl OrderStore for MemoryOrderStore {
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        if self.fail_header.load(Ordering::SeqCst) {
            return Err(injected("header"));
        }
        let mut tables = self.tables();
        let order = Order {
            id: OrderId::random(),
            order_number: tables.next_number,
            status: order.status,
            total_price: order.total_price,
            buyer_id: order.buyer_id,
            company_name: order.company_name.clone(),
            contact_name: order.contact_name.clone(),
            email: order.email.clone(),
            phone: order.phone.clone(),
            shipping_address: order.shipping_address.clone(),
            shipping_city: order.shipping_city.clone(),
            shipping_postal_code: order.shipping_postal_code.clone(),
            shipping_country: order.shipping_country.clone(),
            notes: order.notes.clone(),
            admin_notes: None,
            created_at: self.now,
            updated_at: self.now,
        };
        tables.next_number += 1;
        tables.orders.push(order.clone());
        Ok(order)
    }

    async fn insert_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        self.item_inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_items.load(Ordering::SeqCst) {
            return Err(injected("items"));
        }
        let rows: Vec<OrderItem> = items
            .iter()
            .map(|item| OrderItem {
                id: OrderItemId::random(),
                order_id,
                product_title: item.product_title.clone(),
                variant_title: item.variant_title.clone(),
                sku: item.sku.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total_price: item.total_price,
                image_url: item.image_url.clone(),
            })
            .collect();
        self.tables().items.insert(order_id, rows.clone());
        Ok(rows)
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("delete"));
        }
        let mut tables = self.tables();
        let before = tables.orders.len();
        tables.orders.retain(|o| o.id != order_id);
        tables.items.remove(&order_id);
        if tables.orders.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables().orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn list_orders(&self, buyer_id: Option<BuyerId>) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .tables()
            .orders
            .iter()
            .filter(|o| buyer_id.is_none_or(|b| o.buyer_id == b))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.order_number.cmp(&a.order_number));
        Ok(orders)
    }

    async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        Ok(self
            .tables()
            .items
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(RepositoryError::NotFound)?;
        if order.status != expected {
            return Err(RepositoryError::Conflict(format!(
                "order {order_id} is no longer {expected}"
            )));
        }
        order.status = next;
        order.updated_at = self.now;
        Ok(order.clone())
    }

    async fn update_admin_notes(
        &self,
        order_id: OrderId,
        admin_notes: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.tables();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(RepositoryError::NotFound)?;
        order.admin_notes = admin_notes.map(str::to_owned);
        Ok(order.clone())
    }
}

/// Parse a decimal literal used in fixtures.
///
/// # Panics
///
/// Panics on a malformed literal.
#[must_use]
pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap_or_else(|e| panic!("bad decimal {s:?}: {e}"))
}

/// Noon UTC on the given day.
///
/// # Panics
///
/// Panics on an invalid date.
#[must_use]
pub fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}

fn variant(product_id: u64, size: &str, price: &str, available: bool, stock: Option<i64>) -> Variant {
    let id = product_id * 100 + size.parse::<u64>().unwrap_or(0);
    Variant {
        id: VariantId::from_numeric(id),
        title: format!("{size} / Black"),
        sku: Some(format!("SKU-{product_id}-{size}")),
        selected_options: vec![
            SelectedOption {
                name: "Size".to_owned(),
                value: size.to_owned(),
            },
            SelectedOption {
                name: "Color".to_owned(),
                value: "Black".to_owned(),
            },
        ],
        price: Price::new(dec(price), CurrencyCode::EUR),
        compare_at_price: Some(Price::new(dec(price) * Decimal::TWO, CurrencyCode::EUR)),
        available,
        quantity_available: stock,
        image_url: None,
    }
}

/// A small two-product catalog.
///
/// - `Runner X` (product 1), EUR 65.00, sizes 41 (stock 10), 42 (stock 3),
///   43 (sold out)
/// - `Trail Y` (product 2), EUR 52.00, size 44 (untracked)
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::from_numeric(1),
            title: "Runner X".to_owned(),
            handle: "runner-x".to_owned(),
            product_type: Some("Sneakers".to_owned()),
            vendor: Some("Streim".to_owned()),
            image_url: Some("https://cdn.shopify.com/runner-x.jpg".to_owned()),
            variants: vec![
                variant(1, "41", "65.00", true, Some(10)),
                variant(1, "42", "65.00", true, Some(3)),
                variant(1, "43", "65.00", false, Some(0)),
            ],
        },
        Product {
            id: ProductId::from_numeric(2),
            title: "Trail Y".to_owned(),
            handle: "trail-y".to_owned(),
            product_type: Some("Boots".to_owned()),
            vendor: Some("Streim".to_owned()),
            image_url: None,
            variants: vec![variant(2, "44", "52.00", true, None)],
        },
    ]
}

/// Variant id of a catalog fixture variant.
#[must_use]
pub fn variant_id(product_id: u64, size: u64) -> VariantId {
    VariantId::from_numeric(product_id * 100 + size)
}

/// A profile complete enough to order with.
#[must_use]
pub fn profile(buyer_id: BuyerId) -> BuyerProfile {
    let mut profile = BuyerProfile::blank(buyer_id, "inkoop@schoenhandel.nl");
    profile.company_name = "Schoenhandel De Vries B.V.".to_owned();
    profile.contact_name = "Sam de Vries".to_owned();
    profile.address = Some("Oudegracht 12".to_owned());
    profile.city = Some("Utrecht".to_owned());
    profile.postal_code = Some("3511 AP".to_owned());
    profile.kvk_number = Some("12345678".to_owned());
    profile
}
