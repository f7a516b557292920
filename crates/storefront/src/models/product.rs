//! Product response bodies.

use rust_decimal::Decimal;
use serde::Serialize;

use mazin_core::ranking::{DiscountCandidate, DiscountPickerConfig, ListingProduct};
use mazin_core::{CategoryId, PriceStats, ProductId, VariantId};

use crate::db::products::SearchHit;

/// Image shown when a product has none.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/images/product-default.jpg";

/// A product in a listing response.
///
/// Ranked products come from the listing generator; raw products are passed
/// through from the filtered listing procedure unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProductRecord {
    Ranked(ListingProduct),
    Raw(serde_json::Value),
}

/// `{min, max}` price envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceStatsBody {
    #[serde(with = "super::decimal_number")]
    pub min: Decimal,
    #[serde(with = "super::decimal_number")]
    pub max: Decimal,
}

impl From<PriceStats> for PriceStatsBody {
    fn from(stats: PriceStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
        }
    }
}

/// Body of `GET /api/products`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductRecord>,
    pub mixed: bool,
    /// Only present for search listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PriceStatsBody>,
}

/// Body of `GET /api/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub products: Vec<SearchHit>,
}

/// Body of `GET /api/products/most-viewed`.
#[derive(Debug, Clone, Serialize)]
pub struct MostViewedResponse {
    pub products: Vec<serde_json::Value>,
}

/// Body of `GET /api/types`.
#[derive(Debug, Clone, Serialize)]
pub struct TypesResponse {
    pub types: Vec<serde_json::Value>,
}

/// Body of `POST /api/products/view`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ViewRecorded {
    pub success: bool,
}

/// A card in the homepage discount strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeDiscountCard {
    /// Product id.
    pub id: ProductId,
    pub variant_id: VariantId,
    pub title: String,
    pub image: String,
    #[serde(rename = "oldPrice", with = "super::decimal_number")]
    pub old_price: Decimal,
    #[serde(rename = "newPrice", with = "super::decimal_number")]
    pub new_price: Decimal,
    #[serde(rename = "discountPercent", with = "super::decimal_number")]
    pub discount_percent: Decimal,
    pub fireicon: bool,
    pub inventoryno: i64,
    pub type_id: Option<CategoryId>,
}

impl HomeDiscountCard {
    /// Build a card from a picked candidate.
    #[must_use]
    pub fn from_candidate(candidate: &DiscountCandidate, config: &DiscountPickerConfig) -> Self {
        let discount = candidate.discount();
        Self {
            id: candidate.product_id,
            variant_id: candidate.variant_id,
            title: candidate.title.clone(),
            image: candidate
                .image_urls
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_PRODUCT_IMAGE.to_string()),
            old_price: candidate.price.unwrap_or_default(),
            new_price: candidate.discounted_price.unwrap_or_default(),
            discount_percent: discount,
            fireicon: config.is_hot(discount),
            inventoryno: candidate.effective_stock(),
            type_id: candidate.category_id,
        }
    }
}

/// Body of `GET /api/home/discounted`.
#[derive(Debug, Clone, Serialize)]
pub struct HomeDiscountsResponse {
    pub products: Vec<HomeDiscountCard>,
}
