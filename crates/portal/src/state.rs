//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::config::PortalConfig;
use crate::identity::{IdentityClient, IdentityError};
use crate::services::SubmissionGuard;
use crate::shopify::{AdminClient, ShopifyError};

/// Error building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("shopify client: {0}")]
    Shopify(#[from] ShopifyError),
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    shopify: AdminClient,
    identity: IdentityClient,
    submissions: SubmissionGuard,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an API client cannot be built from the
    /// configuration.
    pub fn new(config: PortalConfig, pool: PgPool) -> Result<Self, StateError> {
        let shopify = AdminClient::new(&config.shopify)?;
        let identity = IdentityClient::new(&config.identity)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shopify,
                identity,
                submissions: SubmissionGuard::new(),
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Buyers with an order submission in flight.
    #[must_use]
    pub fn submissions(&self) -> &SubmissionGuard {
        &self.inner.submissions
    }
}
