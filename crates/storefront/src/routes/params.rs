//! Query parameter parsing shared by the API routes.
//!
//! Numeric parameters are lenient: a value that does not parse is treated as
//! absent instead of rejecting the request.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use mazin_core::{CategoryId, SortMode};

use crate::services::ListingParams;

/// Default page size for product listings and search.
pub const DEFAULT_LIMIT: usize = 50;

/// Deserialize a query value, treating empty or unparsable input as `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.trim().parse().ok()))
}

/// Resolve a requested page size.
///
/// Missing or non-positive values use `default`; the result never exceeds
/// `max`.
#[must_use]
pub fn clamp_limit(requested: Option<i64>, default: usize, max: usize) -> usize {
    requested
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(default)
        .min(max)
}

/// Resolve a requested offset. Negative values start from the top.
#[must_use]
pub fn clamp_offset(requested: Option<i64>) -> usize {
    requested
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

/// Parse the `filters` parameter. Anything but a JSON object becomes `{}`.
#[must_use]
pub fn parse_filters(raw: Option<&str>) -> serde_json::Value {
    raw.and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok())
        .filter(serde_json::Value::is_object)
        .unwrap_or_else(|| serde_json::json!({}))
}

/// Query parameters of `GET /api/products` and `GET /api/products/stats`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub category: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub filters: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub offset: Option<i64>,
}

impl ProductsQuery {
    /// Normalize into service parameters.
    #[must_use]
    pub fn into_params(self, max_limit: usize) -> ListingParams {
        ListingParams {
            search: self.search.as_deref().map(str::trim).unwrap_or_default().to_string(),
            category: CategoryId::from_nullable(self.category),
            min_price: self.min_price,
            max_price: self.max_price,
            sort: self.sort.as_deref().map_or_else(SortMode::default, SortMode::parse),
            filters: parse_filters(self.filters.as_deref()),
            limit: clamp_limit(self.limit, DEFAULT_LIMIT, max_limit),
            offset: clamp_offset(self.offset),
        }
    }
}

/// A bare `limit` parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<i64>,
}
