//! Database migration command.
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Portal migrations live in `crates/portal/migrations/`:
//! ```text
//! migrations/
//! ├── 20261001000001_create_order_status.sql
//! ├── 20261001000002_create_profiles.sql
//! ├── 20261001000003_create_orders.sql
//! └── 20261001000004_create_order_items.sql
//! ```
//!
//! The session table is created by the session store's own migration.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use wholesale_portal::config::{ConfigError, get_database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run portal and session store migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("PORTAL_DATABASE_URL")?;

    tracing::info!("Connecting to portal database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../portal/migrations").run(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Portal migrations complete!");
    Ok(())
}
