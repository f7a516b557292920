//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MAZIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MAZIN_HOST` - Bind address (default: 127.0.0.1)
//! - `MAZIN_PORT` - Listen port (default: 3000)
//! - `MAZIN_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `SUPABASE_URL` / `SUPABASE_ANON_KEY` - Identity provider used to resolve bearer tokens
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//!
//! ## Ranking
//! - `HOME_DISCOUNT_LIMIT` - Cards in the homepage discount strip (default: 12)
//! - `HOME_DISCOUNT_PER_CATEGORY` - Auto-picked cards per category (default: 2)
//! - `HOME_DISCOUNT_AUTO_MIN_PERCENT` - Auto-eligibility threshold (default: 10)
//! - `HOME_DISCOUNT_FIRE_MIN_PERCENT` - "Fire" badge threshold (default: 40)
//! - `LISTING_PAGE_CAP` - Products a generated listing may hold (default: 50)
//! - `LISTING_MAX_LIMIT` - Hard max for `limit` query parameters (default: 100)
//! - `LISTING_FETCH_CAP` - Products read for the listing generator (default: 10000)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use mazin_core::ranking::{DiscountPickerConfig, ListingConfig};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Identity provider, if bearer tokens should be resolved
    pub identity: Option<IdentityConfig>,
    /// Ranking engine tuning
    pub ranking: RankingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Identity provider configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Project URL of the identity provider
    pub url: Url,
    /// Public API key sent with every request
    pub anon_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Ranking engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingConfig {
    /// Homepage discount composer settings
    pub discount: DiscountPickerConfig,
    /// Listing generator settings
    pub listing: ListingConfig,
    /// Hard max for `limit` on listing endpoints
    pub max_limit: usize,
    /// Number of products read for the listing generator
    pub fetch_cap: i64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            discount: DiscountPickerConfig::default(),
            listing: ListingConfig::default(),
            max_limit: 100,
            fetch_cap: 10_000,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MAZIN_DATABASE_URL")?;
        let host = get_parsed_or_default("MAZIN_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = get_parsed_or_default("MAZIN_PORT", 3000)?;
        let base_url = get_env_or_default("MAZIN_BASE_URL", "http://localhost:3000");

        let identity = IdentityConfig::from_env()?;
        let ranking = RankingConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            identity,
            ranking,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(url), Some(anon_key)) = (
            get_optional_env("SUPABASE_URL"),
            get_optional_env("SUPABASE_ANON_KEY"),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            url: parse_value("SUPABASE_URL", &url)?,
            anon_key: SecretString::from(anon_key),
        }))
    }
}

impl RankingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let discount = DiscountPickerConfig {
            page_limit: get_positive_or_default(
                "HOME_DISCOUNT_LIMIT",
                defaults.discount.page_limit,
            )?,
            per_category_cap: get_positive_or_default(
                "HOME_DISCOUNT_PER_CATEGORY",
                defaults.discount.per_category_cap,
            )?,
            auto_min_percent: get_parsed_or_default::<Decimal>(
                "HOME_DISCOUNT_AUTO_MIN_PERCENT",
                defaults.discount.auto_min_percent,
            )?,
            fire_min_percent: get_parsed_or_default::<Decimal>(
                "HOME_DISCOUNT_FIRE_MIN_PERCENT",
                defaults.discount.fire_min_percent,
            )?,
        };

        let listing = ListingConfig {
            page_cap: get_positive_or_default("LISTING_PAGE_CAP", defaults.listing.page_cap)?,
        };

        Ok(Self {
            discount,
            listing,
            max_limit: get_positive_or_default("LISTING_MAX_LIMIT", defaults.max_limit)?,
            fetch_cap: get_parsed_or_default("LISTING_FETCH_CAP", defaults.fetch_cap)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a raw value, naming the variable in the error.
fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

/// Like [`get_parsed_or_default`] but rejects zero.
fn get_positive_or_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = get_parsed_or_default(key, default)?;
    ensure_positive(key, value)
}

fn ensure_positive(key: &str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}
