//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    AuthRejection, RequireBuyer, RequireStaff, clear_current_buyer, set_current_buyer,
};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, load_cart, store_cart};
