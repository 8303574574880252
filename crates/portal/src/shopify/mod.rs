//! Shopify Admin REST API client.
//!
//! # Architecture
//!
//! - Shopify is source of truth for products, variants and stock - no local sync
//! - REST payloads are deserialized into the types in [`types`] and converted
//!   once into `wholesale_core` catalog types
//! - In-memory caching via `moka`: catalog for 5 minutes, stock for 30 seconds
//!
//! # Example
//!
//! ```rust,ignore
//! use wholesale_portal::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify)?;
//! let (catalog, stock) = tokio::join!(client.fetch_catalog(), client.fetch_stock());
//! ```

mod cache;
mod client;
mod conversions;
pub mod types;

pub use client::AdminClient;
pub use conversions::{collect_stock, convert_product};

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Client could not be constructed (bad header value, TLS backend).
    #[error("Client setup error: {0}")]
    Setup(String),
}

/// Extract the `rel="next"` URL from a `Link` response header.
///
/// Shopify paginates REST collections with
/// `Link: <https://…&page_info=abc>; rel="next", <…>; rel="previous"`.
#[must_use]
pub fn parse_next_link(header: &str) -> Option<String> {
    header
        .split(',')
        .map(str::trim)
        .find(|segment| segment.ends_with("rel=\"next\""))
        .and_then(|segment| segment.split(';').next())
        .map(|url| url.trim().trim_start_matches('<').trim_end_matches('>').to_owned())
        .filter(|url| !url.is_empty())
}
