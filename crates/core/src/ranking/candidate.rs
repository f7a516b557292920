//! Candidate records handed to the ranking engine.
//!
//! Both records are read-only projections of catalog rows. Raw numeric columns
//! stay optional here; the accessors apply the clamping rules so the comparator
//! and composers never see negative stock, negative discounts or negative
//! savings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId, VariantId};

/// A discounted product variant competing for the homepage discount strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCandidate {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    /// Category of the parent product.
    pub category_id: Option<CategoryId>,
    /// Title of the parent product.
    pub title: String,
    /// Images of the parent product, first one is the cover.
    pub image_urls: Vec<String>,
    pub price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub stock_quantity: Option<i64>,
    /// Explicitly pinned to the homepage by an admin.
    pub pinned: bool,
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    /// Creation time of the parent product.
    pub product_created_at: Option<DateTime<Utc>>,
}

impl DiscountCandidate {
    /// Stock quantity floored at zero.
    #[must_use]
    pub fn effective_stock(&self) -> i64 {
        self.stock_quantity.unwrap_or(0).max(0)
    }

    /// Discount percentage floored at zero.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.discount_percent.unwrap_or_default().max(Decimal::ZERO)
    }

    /// `price - discounted_price`, floored at zero.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        let price = self.price.unwrap_or_default();
        let discounted = self.discounted_price.unwrap_or_default();
        (price - discounted).max(Decimal::ZERO)
    }

    /// Milliseconds since the epoch used for recency ordering.
    ///
    /// Prefers the pin time, then the variant's creation time, then the parent
    /// product's creation time. Missing timestamps count as the epoch.
    #[must_use]
    pub fn recency_millis(&self) -> i64 {
        self.pinned_at
            .or(self.created_at)
            .or(self.product_created_at)
            .map_or(0, |t| t.timestamp_millis())
    }
}

/// A product with its variants, as listed on search and category pages.
///
/// Serialized field names follow the catalog tables so the frontend receives
/// the same shape it would get from the backend directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingProduct {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(rename = "type_id", default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "product_variants", default)]
    pub variants: Vec<ListingVariant>,
}

/// A purchasable variant of a [`ListingProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingVariant {
    pub id: VariantId,
    /// Unreadable prices (`NaN`, garbage text) read as `None`.
    #[serde(
        default,
        deserialize_with = "catalog_number::decimal",
        serialize_with = "catalog_number::serialize_decimal"
    )]
    pub price: Option<Decimal>,
    /// Fractional or unreadable quantities read as `None`.
    #[serde(default, deserialize_with = "catalog_number::integer")]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// Lenient serde for numeric catalog columns.
///
/// A single bad value must not reject the whole row, so anything that is not
/// a finite number (or a string holding one) becomes `None`. Prices are
/// written back as JSON numbers.
mod catalog_number {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n
                .to_string()
                .parse()
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    #[allow(clippy::ref_option)] // serde's `serialize_with` passes a reference
    pub fn serialize_decimal<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value.as_ref().and_then(ToPrimitive::to_f64) {
            Some(n) => serializer.serialize_f64(n),
            None => serializer.serialize_none(),
        }
    }
}

impl ListingProduct {
    /// Whether the title or product code contains `needle`, ignoring case.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .product_code
                .as_deref()
                .is_some_and(|code| code.to_lowercase().contains(needle))
    }

    /// Creation time in milliseconds since the epoch, missing counts as zero.
    #[must_use]
    pub fn recency_millis(&self) -> i64 {
        self.created_at.map_or(0, |t| t.timestamp_millis())
    }

    /// Every known variant price.
    pub fn prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.variants.iter().filter_map(|v| v.price)
    }

    /// Cheapest variant price, if any variant has one.
    #[must_use]
    pub fn min_price(&self) -> Option<Decimal> {
        self.prices().min()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by the ranking tests.

    use chrono::TimeZone;

    use super::*;

    pub fn at(seconds: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(seconds, 0).single()
    }

    pub fn discount(variant: i64, product: i64, percent: i64) -> DiscountCandidate {
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

    pub fn product(id: i64, category: Option<i64>, title: &str, created: i64) -> ListingProduct {
        ListingProduct {
            id: ProductId::new(id),
            title: title.to_string(),
            product_code: None,
            category_id: category.map(CategoryId::new),
            image_urls: Vec::new(),
            created_at: at(created),
            variants: Vec::new(),
        }
    }

    pub fn with_prices(mut product: ListingProduct, prices: &[i64]) -> ListingProduct {
        product.variants = prices
            .iter()
            .enumerate()
            .map(|(i, price)| ListingVariant {
                id: VariantId::new(product.id.as_i64() * 100 + i64::try_from(i).unwrap_or(0)),
                price: Some(Decimal::from(*price)),
                stock_quantity: Some(1),
                attributes: serde_json::Value::Null,
            })
            .collect();
        product
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_effective_stock_clamps_negative_and_missing() {
        let mut c = discount(1, 1, 10);
        c.stock_quantity = Some(-4);
        assert_eq!(c.effective_stock(), 0);
        c.stock_quantity = None;
        assert_eq!(c.effective_stock(), 0);
        c.stock_quantity = Some(9);
        assert_eq!(c.effective_stock(), 9);
    }

    #[test]
    fn test_discount_clamps_negative_and_missing() {
        let mut c = discount(1, 1, 10);
        c.discount_percent = Some(Decimal::from(-3));
        assert_eq!(c.discount(), Decimal::ZERO);
        c.discount_percent = None;
        assert_eq!(c.discount(), Decimal::ZERO);
    }

    #[test]
    fn test_savings_never_negative() {
        let mut c = discount(1, 1, 10);
        assert_eq!(c.savings(), Decimal::from(10));
        c.discounted_price = Some(Decimal::from(150));
        assert_eq!(c.savings(), Decimal::ZERO);
        c.discounted_price = None;
        assert_eq!(c.savings(), Decimal::from(100));
    }

    #[test]
    fn test_recency_prefers_pin_then_own_then_parent() {
        let mut c = discount(1, 1, 10);
        assert_eq!(c.recency_millis(), 0);
        c.product_created_at = at(10);
        assert_eq!(c.recency_millis(), 10_000);
        c.created_at = at(20);
        assert_eq!(c.recency_millis(), 20_000);
        c.pinned_at = at(5);
        assert_eq!(c.recency_millis(), 5_000);
    }

    #[test]
    fn test_matches_title_or_code_case_insensitive() {
        let mut p = product(1, Some(1), "Blue Ceramic Mug", 0);
        assert!(p.matches("ceramic"));
        assert!(!p.matches("kz-"));
        p.product_code = Some("KZ-100".to_string());
        assert!(p.matches("kz-"));
    }

    #[test]
    fn test_min_price_ignores_missing_prices() {
        let mut p = with_prices(product(1, Some(1), "x", 0), &[30, 20]);
        assert_eq!(p.min_price(), Some(Decimal::from(20)));
        for v in &mut p.variants {
            v.price = None;
        }
        assert_eq!(p.min_price(), None);
    }

    #[test]
    fn test_listing_product_deserializes_table_shape() {
        let json = serde_json::json!({
            "id": 4,
            "title": "Lamp",
            "product_code": null,
            "type_id": 2,
            "image_urls": ["a.jpg"],
            "created_at": "2024-05-01T10:00:00Z",
            "product_variants": [{ "id": 40, "price": "120.50" }]
        });
        let product: ListingProduct =
            serde_json::from_value(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(product.category_id, Some(CategoryId::new(2)));
        assert_eq!(product.min_price(), Some(Decimal::new(12050, 2)));
    }

    #[test]
    fn test_bad_variant_numbers_keep_siblings() {
        let json = serde_json::json!([
            { "id": 1, "price": "100", "stock_quantity": 2 },
            { "id": 2, "price": "NaN", "stock_quantity": 1.5 },
            { "id": 3, "price": "cheap", "stock_quantity": "many" },
            { "id": 4, "price": 42.5, "stock_quantity": "7" },
            { "id": 5, "price": [], "stock_quantity": {} }
        ]);
        let variants: Vec<ListingVariant> =
            serde_json::from_value(json).unwrap_or_else(|e| panic!("{e}"));

        let prices: Vec<Option<Decimal>> = variants.iter().map(|v| v.price).collect();
        assert_eq!(
            prices,
            vec![
                Some(Decimal::from(100)),
                None,
                None,
                Some(Decimal::new(425, 1)),
                None
            ]
        );
        let stock: Vec<Option<i64>> = variants.iter().map(|v| v.stock_quantity).collect();
        assert_eq!(stock, vec![Some(2), None, None, Some(7), None]);
    }

    #[test]
    fn test_bad_variant_does_not_drop_product() {
        let json = serde_json::json!({
            "id": 9,
            "title": "Kettle",
            "type_id": 1,
            "product_variants": [
                { "id": 90, "price": "NaN" },
                { "id": 91, "price": "80" }
            ]
        });
        let product: ListingProduct =
            serde_json::from_value(json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.min_price(), Some(Decimal::from(80)));
    }

    #[test]
    fn test_variant_price_serializes_as_number() {
        let mug = with_prices(product(1, Some(1), "Mug", 0), &[250_000]);
        let value = serde_json::to_value(&mug).unwrap_or_default();
        assert_eq!(value["product_variants"][0]["price"], serde_json::json!(250_000.0));

        let mut unpriced = mug;
        for v in &mut unpriced.variants {
            v.price = None;
        }
        let value = serde_json::to_value(&unpriced).unwrap_or_default();
        assert!(value["product_variants"][0]["price"].is_null());
    }
}
