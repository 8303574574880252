//! Wholesale Core - Domain types and order logic.
//!
//! This crate provides the types and pure functions shared by the wholesale
//! portal components:
//! - `portal` - Buyer and staff HTTP API
//! - `cli` - Command-line tools for migrations and document rendering
//!
//! # Architecture
//!
//! The core crate contains only types and computations - no I/O, no database
//! access, no HTTP clients. Every function here is synchronous and
//! deterministic, which keeps the order math testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices and order statuses
//! - [`catalog`] - Products and variants as read from the catalog source
//! - [`size`] - Size extraction from free-text variant labels
//! - [`grouping`] - Per-product aggregation of order items
//! - [`document`] - Order confirmation and invoice rendering
//! - [`cart`] - In-progress buyer selection
//! - [`inventory`] - Stock snapshot and orderable-quantity caps
//! - [`order`] - Orders, order items and submission drafts
//! - [`profile`] - Buyer company profile

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod document;
pub mod grouping;
pub mod inventory;
pub mod order;
pub mod profile;
pub mod size;
pub mod types;

pub use types::*;
