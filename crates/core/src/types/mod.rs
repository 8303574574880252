//! Core types for the wholesale portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError, format_amount, round_money};
pub use status::*;
