//! HTTP route handlers for the portal JSON API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /auth/session                 - Exchange identity token for a session
//! POST   /auth/logout                  - Drop the session
//!
//! # Buyer API (requires sign-in)
//! GET    /api/catalog                  - Products with per-variant stock (?product_type, ?q)
//! GET    /api/cart                     - Cart with totals and minimum status
//! DELETE /api/cart                     - Clear cart
//! POST   /api/cart/items               - Add variant
//! PUT    /api/cart/items/{variant_id}  - Set quantity
//! DELETE /api/cart/items/{variant_id}  - Remove variant
//! POST   /api/checkout                 - Submit cart as an order
//! GET    /api/orders                   - Own orders
//! GET    /api/orders/{id}              - Own order with items
//! GET    /api/profile                  - Company profile
//! PUT    /api/profile                  - Update company profile
//!
//! # Staff API (requires staff role)
//! GET    /api/admin/orders                        - All orders
//! GET    /api/admin/orders/{id}                   - Order with items
//! PUT    /api/admin/orders/{id}/status            - Change status
//! PUT    /api/admin/orders/{id}/notes             - Set internal notes
//! GET    /api/admin/orders/{id}/documents/{kind}  - Confirmation or invoice
//! ```
//!
//! `/health` and `/health/ready` are mounted in `main.rs`.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod profile;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(auth::create_session))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{variant_id}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the staff routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::show_order))
        .route("/orders/{id}/status", put(admin::update_status))
        .route("/orders/{id}/notes", put(admin::update_notes))
        .route("/orders/{id}/documents/{kind}", get(admin::document))
}

/// Create the buyer API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::submit))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/profile", get(profile::show).put(profile::update))
        .nest("/admin", admin_routes())
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
