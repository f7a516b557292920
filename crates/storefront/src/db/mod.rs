//! Database operations against the catalog `PostgreSQL`.
//!
//! # Tables
//!
//! - `products` - Catalog products (`type_id` references `types`)
//! - `product_variants` - Purchasable variants with prices, discounts and pins
//! - `types` - Product categories
//! - `product_daily_views` - One row per product, viewer and day
//! - `tower_sessions.session` - Visitor sessions
//!
//! # Stored procedures
//!
//! - `get_products_filtered` - Attribute-filtered, paginated listing
//! - `get_products_price_stats` - Price envelope for a filtered listing
//! - `get_most_viewed_products` - Products ranked by recent views
//! - `get_types_with_details` - Categories with their attributes
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database.

pub mod categories;
pub mod discounts;
pub mod products;
pub mod views;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use discounts::DiscountRepository;
pub use products::ProductRepository;
pub use views::ViewRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Collect the string entries of a JSON image list.
///
/// Anything that is not an array of strings yields an empty list.
pub(crate) fn image_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|urls| {
            urls.iter()
                .filter_map(|url| url.as_str())
                .filter(|url| !url.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
