//! Session middleware configuration and cart persistence.
//!
//! Sessions live in `PostgreSQL` via `tower-sessions-sqlx-store`. The buyer's
//! cart is stored in the session as a serialized [`Cart`] snapshot.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use wholesale_core::cart::Cart;

use crate::config::PortalConfig;
use crate::models::session_keys;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "wp_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &PortalConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The session table is created by `wp-cli migrate`
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the cart held in the session, or an empty cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Replace the cart held in the session.
///
/// An empty cart removes the key.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    if cart.is_empty() {
        session.remove::<Cart>(session_keys::CART).await?;
        return Ok(());
    }
    session.insert(session_keys::CART, cart).await
}
