//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `PORTAL_BASE_URL` - Public URL for the portal
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (read products + inventory)
//! - `IDENTITY_URL` - Identity service base URL
//! - `IDENTITY_API_KEY` - Identity service API key
//!
//! ## Optional
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `SHOPIFY_PAGE_SIZE` - Products per catalog page (default: 250, max 250)
//! - `SHOPIFY_MAX_PAGES` - Upper bound on catalog pages fetched (default: 20)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)
//! - `SELLER_COMPANY_NAME`, `SELLER_ADDRESS` (lines separated by `|`),
//!   `SELLER_WEBSITE`, `SELLER_EMAIL`, `SELLER_BANK_NAME`,
//!   `SELLER_ACCOUNT_HOLDER`, `SELLER_IBAN`, `SELLER_BIC`,
//!   `SELLER_REGISTRATION_NUMBER`, `SELLER_VAT_ID` - Details printed on documents

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use wholesale_core::document::SellerDetails;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Largest page size the catalog source accepts.
pub const MAX_SHOPIFY_PAGE_SIZE: u32 = 250;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Identity service configuration
    pub identity: IdentityConfig,
    /// Seller details printed on documents
    pub seller: SellerDetails,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// Products requested per page
    pub page_size: u32,
    /// Maximum number of pages fetched per catalog load
    pub max_pages: u32,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

/// Identity service configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity service
    pub url: String,
    /// API key sent with every identity request
    pub api_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("PORTAL_DATABASE_URL")?;
        let host = parse_env::<IpAddr>("PORTAL_HOST", "127.0.0.1")?;
        let port = parse_env::<u16>("PORTAL_PORT", "3000")?;
        let base_url = get_required_env("PORTAL_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PORTAL_BASE_URL".to_string(), e.to_string()))?;

        let shopify = ShopifyConfig::from_env()?;
        let identity = IdentityConfig::from_env()?;
        let seller = seller_from_env();

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            shopify,
            identity,
            seller,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let page_size = parse_env::<u32>("SHOPIFY_PAGE_SIZE", "250")?;
        validate_page_size(page_size)?;

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2025-01"),
            access_token: get_validated_secret("SHOPIFY_ACCESS_TOKEN")?,
            page_size,
            max_pages: parse_env::<u32>("SHOPIFY_MAX_PAGES", "20")?.max(1),
        })
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: get_required_env("IDENTITY_URL")?
                .trim_end_matches('/')
                .to_string(),
            api_key: get_validated_secret("IDENTITY_API_KEY")?,
        })
    }
}

/// Load seller details, defaulting to the studio that operates the portal.
#[must_use]
pub fn seller_from_env() -> SellerDetails {
    let company_name = get_env_or_default("SELLER_COMPANY_NAME", "STREIM STUDIO B.V.");
    SellerDetails {
        address_lines: get_env_or_default("SELLER_ADDRESS", "Keizersgracht 572|1017 EM Amsterdam")
            .split('|')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        website: Some(get_env_or_default("SELLER_WEBSITE", "www.streim.nl")),
        email: Some(get_env_or_default("SELLER_EMAIL", "daniel@streim.nl")),
        bank_name: get_env_or_default("SELLER_BANK_NAME", "ABN Amro"),
        account_holder: get_optional_env("SELLER_ACCOUNT_HOLDER")
            .unwrap_or_else(|| company_name.clone()),
        iban: get_env_or_default("SELLER_IBAN", "NL20ABNA0110719298"),
        bic: get_env_or_default("SELLER_BIC", "ABNANL2A"),
        registration_number: get_env_or_default("SELLER_REGISTRATION_NUMBER", "85681563"),
        vat_id: get_env_or_default("SELLER_VAT_ID", "NL863705832B01"),
        company_name,
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
pub fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, using `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn validate_page_size(page_size: u32) -> Result<(), ConfigError> {
    if page_size == 0 || page_size > MAX_SHOPIFY_PAGE_SIZE {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPIFY_PAGE_SIZE".to_string(),
            format!("must be between 1 and {MAX_SHOPIFY_PAGE_SIZE} (got {page_size})"),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-admin-token-here", "SHOPIFY_ACCESS_TOKEN");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "IDENTITY_API_KEY");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("shpat_9f3Kq7Lm2Zx8Rv4Tb1Nw6Yc0Hd5Js", "SHOPIFY_ACCESS_TOKEN");
        assert!(result.is_ok());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(validate_page_size(250).is_ok());
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(251).is_err());
    }

    #[test]
    fn test_shopify_config_debug_redacts_secrets() {
        let config = ShopifyConfig {
            store: "wholesale.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_super_private_value"),
            page_size: 250,
            max_pages: 20,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("wholesale.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_private_value"));
    }

    #[test]
    fn test_identity_config_debug_redacts_secrets() {
        let config = IdentityConfig {
            url: "https://id.example.net".to_string(),
            api_key: SecretString::from("anon_key_value"),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("anon_key_value"));
    }
}
