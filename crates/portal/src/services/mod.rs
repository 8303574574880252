//! Business logic services for the portal.
//!
//! Services are generic over [`OrderStore`](crate::db::OrderStore) so they
//! run unchanged against `PostgreSQL` and against in-memory stores in tests.
//!
//! - `checkout` - Order submission workflow
//! - `orders` - Order lookup, status changes, and documents

pub mod checkout;
pub mod orders;

pub use checkout::{CheckoutError, SubmissionGuard, SubmittedOrder, submit_order};
pub use orders::{OrderServiceError, OrderWithItems, change_status, load_order, render_order_document};
