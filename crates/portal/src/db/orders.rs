//! Order repository for database operations.
//!
//! Queries use runtime-checked `sqlx::query_as` with `FromRow` row structs;
//! rows are converted into core order types at this boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use wholesale_core::order::{NewOrder, NewOrderItem, Order, OrderItem};
use wholesale_core::{BuyerId, OrderId, OrderItemId, OrderStatus};

use super::{OrderStore, RepositoryError};

const ORDER_COLUMNS: &str = "id, order_number, status, total_price, buyer_id, company_name, \
     contact_name, email, phone, shipping_address, shipping_city, shipping_postal_code, \
     shipping_country, notes, admin_notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_title, variant_title, sku, quantity, \
     unit_price, total_price, image_url";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: i64,
    status: OrderStatus,
    total_price: Decimal,
    buyer_id: BuyerId,
    company_name: String,
    contact_name: String,
    email: String,
    phone: Option<String>,
    shipping_address: Option<String>,
    shipping_city: Option<String>,
    shipping_postal_code: Option<String>,
    shipping_country: Option<String>,
    notes: Option<String>,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            order_number: r.order_number,
            status: r.status,
            total_price: r.total_price,
            buyer_id: r.buyer_id,
            company_name: r.company_name,
            contact_name: r.contact_name,
            email: r.email,
            phone: r.phone,
            shipping_address: r.shipping_address,
            shipping_city: r.shipping_city,
            shipping_postal_code: r.shipping_postal_code,
            shipping_country: r.shipping_country,
            notes: r.notes,
            admin_notes: r.admin_notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_title: String,
    variant_title: Option<String>,
    sku: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
    image_url: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(r: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(r.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on order item {}",
                r.quantity, r.id
            ))
        })?;

        Ok(Self {
            id: r.id,
            order_id: r.order_id,
            product_title: r.product_title,
            variant_title: r.variant_title,
            sku: r.sku,
            quantity,
            unit_price: r.unit_price,
            total_price: r.total_price,
            image_url: r.image_url,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, order_id: OrderId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(order_id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO orders (
                status, total_price, buyer_id, company_name, contact_name, email, phone,
                shipping_address, shipping_city, shipping_postal_code, shipping_country, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row: OrderRow = sqlx::query_as(&sql)
            .bind(order.status)
            .bind(order.total_price)
            .bind(order.buyer_id)
            .bind(&order.company_name)
            .bind(&order.contact_name)
            .bind(&order.email)
            .bind(&order.phone)
            .bind(&order.shipping_address)
            .bind(&order.shipping_city)
            .bind(&order.shipping_postal_code)
            .bind(&order.shipping_country)
            .bind(&order.notes)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    async fn insert_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO order_items (
                order_id, position, product_title, variant_title, sku, quantity,
                unit_price, total_price, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ITEM_COLUMNS}
            "
        );

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| RepositoryError::Conflict("too many order items".to_owned()))?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::Conflict(format!("quantity {} out of range", item.quantity))
            })?;

            let row: OrderItemRow = sqlx::query_as(&sql)
                .bind(order_id)
                .bind(position)
                .bind(&item.product_title)
                .bind(&item.variant_title)
                .bind(&item.sku)
                .bind(quantity)
                .bind(item.unit_price)
                .bind(item.total_price)
                .bind(&item.image_url)
                .fetch_one(&mut *tx)
                .await?;

            inserted.push(OrderItem::try_from(row)?);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Order::from))
    }

    async fn list_orders(&self, buyer_id: Option<BuyerId>) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::uuid IS NULL OR buyer_id = $1)
            ORDER BY created_at DESC, order_number DESC
            "
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(buyer_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position"
        );
        let rows: Vec<OrderItemRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(OrderItem::try_from).collect()
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .bind(expected)
            .bind(next)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(r.into()),
            None if self.exists(order_id).await? => Err(RepositoryError::Conflict(format!(
                "order {order_id} is no longer {expected}"
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn update_admin_notes(
        &self,
        order_id: OrderId,
        admin_notes: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            UPDATE orders
            SET admin_notes = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        );
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .bind(admin_notes)
            .fetch_optional(self.pool)
            .await?;

        row.map(Order::from).ok_or(RepositoryError::NotFound)
    }
}
