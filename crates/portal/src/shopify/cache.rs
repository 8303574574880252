//! Cache types for Admin API responses.

use std::sync::Arc;

use wholesale_core::catalog::Product;
use wholesale_core::inventory::StockSnapshot;

/// Cache key for catalog and stock lookups.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
    Stock,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Catalog(Arc<Vec<Product>>),
    Stock(Arc<StockSnapshot>),
}
