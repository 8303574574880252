//! Shopify Admin REST API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. The converted catalog is cached for 5
//! minutes and stock snapshots for 30 seconds using `moka`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue, LINK};
use secrecy::ExposeSecret;
use tracing::{debug, instrument, warn};

use wholesale_core::catalog::Product;
use wholesale_core::inventory::StockSnapshot;

use crate::config::ShopifyConfig;

use super::cache::{CacheKey, CacheValue};
use super::conversions::{collect_stock, convert_product};
use super::types::{ProductsResponse, RestProduct};
use super::{ShopifyError, parse_next_link};

const CATALOG_TTL: Duration = Duration::from_secs(300);
const STOCK_TTL: Duration = Duration::from_secs(30);

/// Client for the Shopify Admin REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool and caches.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    products_url: String,
    page_size: u32,
    max_pages: u32,
    catalog_cache: Cache<CacheKey, CacheValue>,
    stock_cache: Cache<CacheKey, CacheValue>,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Setup` if the access token is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Shopify-Access-Token",
            HeaderValue::from_str(config.access_token.expose_secret())
                .map_err(|e| ShopifyError::Setup(format!("Invalid access token header: {e}")))?,
        );
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ShopifyError::Setup(e.to_string()))?;

        let products_url = format!(
            "https://{}/admin/api/{}/products.json",
            config.store, config.api_version
        );

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                products_url,
                page_size: config.page_size,
                max_pages: config.max_pages,
                catalog_cache: Cache::builder()
                    .max_capacity(4)
                    .time_to_live(CATALOG_TTL)
                    .build(),
                stock_cache: Cache::builder()
                    .max_capacity(4)
                    .time_to_live(STOCK_TTL)
                    .build(),
            }),
        })
    }

    /// Fetch one page and the URL of the next, if any.
    async fn get_page(&self, url: &str) -> Result<(ProductsResponse, Option<String>), ShopifyError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(url.to_owned()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        let page: ProductsResponse = match serde_json::from_str(&response_text) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify products response"
                );
                return Err(ShopifyError::Parse(e.to_string()));
            }
        };

        Ok((page, next))
    }

    /// Walk `Link` pagination from the first page, bounded by `max_pages`.
    async fn fetch_all(&self, fields: Option<&str>) -> Result<Vec<RestProduct>, ShopifyError> {
        let mut url = url::Url::parse(&self.inner.products_url)
            .map_err(|e| ShopifyError::Setup(format!("Invalid products URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("status", "active")
                .append_pair("limit", &self.inner.page_size.to_string());
            if let Some(fields) = fields {
                query.append_pair("fields", fields);
            }
        }

        let mut products = Vec::new();
        let mut next = Some(url.to_string());
        let mut pages = 0;

        while let Some(page_url) = next {
            if pages >= self.inner.max_pages {
                warn!(
                    max_pages = self.inner.max_pages,
                    fetched = products.len(),
                    "Stopped Shopify pagination at page limit"
                );
                break;
            }
            let (page, following) = self.get_page(&page_url).await?;
            products.extend(page.products);
            next = following;
            pages += 1;
        }

        debug!(pages, products = products.len(), "Fetched Shopify products");
        Ok(products)
    }

    /// Get the active catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or a price is malformed.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Arc<Vec<Product>>, ShopifyError> {
        if let Some(CacheValue::Catalog(products)) =
            self.inner.catalog_cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products = self
            .fetch_all(None)
            .await?
            .into_iter()
            .map(convert_product)
            .collect::<Result<Vec<_>, _>>()?;
        let products = Arc::new(products);

        self.inner
            .catalog_cache
            .insert(CacheKey::Catalog, CacheValue::Catalog(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get current stock levels keyed by variant GID.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails. Callers are expected to
    /// fall back to [`StockSnapshot::empty`].
    #[instrument(skip(self))]
    pub async fn fetch_stock(&self) -> Result<Arc<StockSnapshot>, ShopifyError> {
        if let Some(CacheValue::Stock(snapshot)) =
            self.inner.stock_cache.get(&CacheKey::Stock).await
        {
            debug!("Cache hit for stock");
            return Ok(snapshot);
        }

        let products = self.fetch_all(Some("id,variants")).await?;
        let mut snapshot = StockSnapshot::empty();
        collect_stock(&mut snapshot, &products);
        let snapshot = Arc::new(snapshot);

        self.inner
            .stock_cache
            .insert(CacheKey::Stock, CacheValue::Stock(Arc::clone(&snapshot)))
            .await;

        Ok(snapshot)
    }

    /// Stock levels, or an empty snapshot if Shopify is unreachable.
    ///
    /// Every variant then counts as unknown stock.
    pub async fn stock_or_empty(&self) -> Arc<StockSnapshot> {
        match self.fetch_stock().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Stock fetch failed, treating all stock as unknown");
                Arc::new(StockSnapshot::empty())
            }
        }
    }
}
