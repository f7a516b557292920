//! Integration tests for Mazin.
//!
//! # Running Tests
//!
//! ```bash
//! # Ranking engine tests run without any services
//! cargo test -p mazin-integration-tests
//!
//! # HTTP tests need a running storefront and database
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p mazin-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `ranking` - Public API of the ranking engine
//! - `storefront_api` - Storefront HTTP API
//!
//! This crate only holds shared catalog builders for the test files.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use mazin_core::ranking::{DiscountCandidate, ListingProduct, ListingVariant};
use mazin_core::{CategoryId, ProductId, VariantId};

/// A timestamp `seconds` after the epoch.
#[must_use]
pub fn at(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

/// An in-stock, unpinned discounted variant in category 1.
#[must_use]
pub fn discounted_variant(variant: i64, product: i64, percent: i64) -> DiscountCandidate {
    DiscountCandidate {
        variant_id: VariantId::new(variant),
        product_id: ProductId::new(product),
        category_id: Some(CategoryId::new(1)),
        title: format!("product {product}"),
        image_urls: Vec::new(),
        price: Some(Decimal::from(100)),
        discounted_price: Some(Decimal::from(100 - percent)),
        discount_percent: Some(Decimal::from(percent)),
        stock_quantity: Some(5),
        pinned: false,
        pinned_at: None,
        created_at: None,
        product_created_at: None,
    }
}

/// A listing product with one variant per price.
#[must_use]
pub fn listed_product(
    id: i64,
    category: Option<i64>,
    title: &str,
    created: i64,
    prices: &[i64],
) -> ListingProduct {
    ListingProduct {
        id: ProductId::new(id),
        title: title.to_string(),
        product_code: None,
        category_id: category.map(CategoryId::new),
        image_urls: Vec::new(),
        created_at: at(created),
        variants: prices
            .iter()
            .zip(0..)
            .map(|(price, i)| ListingVariant {
                id: VariantId::new(id * 100 + i),
                price: Some(Decimal::from(*price)),
                stock_quantity: Some(1),
                attributes: serde_json::Value::Null,
            })
            .collect(),
    }
}
