//! CLI command implementations.

pub mod document;
pub mod migrate;
