//! Order document command.
//!
//! Renders the same confirmation or invoice that staff get from
//! `GET /api/admin/orders/{id}/documents/{kind}`, using the `SELLER_*`
//! environment variables for the seller block.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use wholesale_core::OrderId;
use wholesale_core::document::DocumentKind;
use wholesale_portal::config::{ConfigError, get_database_url, seller_from_env};
use wholesale_portal::db::OrderRepository;
use wholesale_portal::services::{OrderServiceError, render_order_document};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Order(#[from] OrderServiceError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render a document for `order_id` to stdout.
///
/// # Errors
///
/// Returns an error if the order cannot be loaded.
pub async fn render(order_id: OrderId, kind: DocumentKind, json: bool) -> Result<(), DocumentError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("PORTAL_DATABASE_URL")?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    let store = OrderRepository::new(&pool);

    let document = render_order_document(&store, order_id, kind, &seller_from_env()).await?;
    tracing::info!(number = %document.number, %kind, "Rendered document");

    let output = if json {
        serde_json::to_string_pretty(&document)?
    } else {
        document.to_string()
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
