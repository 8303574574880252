//! Database operations for the portal `PostgreSQL` database.
//!
//! The catalog lives in Shopify; the portal stores only what it owns:
//!
//! ## Tables
//!
//! - `orders` - Submitted order headers (profile snapshot, status, notes)
//! - `order_items` - Order lines
//! - `profiles` - Buyer company profiles
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/portal/migrations/` and run via:
//! ```bash
//! cargo run -p wholesale-cli -- migrate
//! ```

pub mod orders;
pub mod profiles;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use wholesale_core::order::{NewOrder, NewOrderItem, Order, OrderItem};
use wholesale_core::{BuyerId, OrderId, OrderStatus};

pub use orders::OrderRepository;
pub use profiles::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or concurrent modification.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence port for orders.
///
/// Implemented by [`OrderRepository`] for `PostgreSQL`. The checkout workflow
/// and the order services depend only on this trait.
pub trait OrderStore: Send + Sync {
    /// Insert an order header and return it with its assigned id, order
    /// number and timestamps.
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Insert all lines of an order. Either every line is written or none.
    fn insert_items(
        &self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> impl Future<Output = Result<Vec<OrderItem>, RepositoryError>> + Send;

    /// Delete an order header (and any lines). Used to compensate a failed
    /// submission.
    fn delete_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn get_order(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// List orders newest first, optionally limited to one buyer.
    fn list_orders(
        &self,
        buyer_id: Option<BuyerId>,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// Lines of an order in insertion order.
    fn get_items(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Vec<OrderItem>, RepositoryError>> + Send;

    /// Move an order from `expected` to `next`.
    ///
    /// Returns [`RepositoryError::Conflict`] if the stored status is no longer
    /// `expected`, and [`RepositoryError::NotFound`] if the order is missing.
    fn update_status(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    fn update_admin_notes(
        &self,
        order_id: OrderId,
        admin_notes: Option<&str>,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
