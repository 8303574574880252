//! Portal-side models that are not part of the core domain.

pub mod session;

pub use session::{CurrentBuyer, keys as session_keys};
