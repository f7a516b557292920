//! Discount candidates for the homepage strip.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use mazin_core::ranking::DiscountCandidate;
use mazin_core::{CategoryId, ProductId, VariantId};

use super::{RepositoryError, image_list};

/// Discount candidates, pinned or above the auto threshold (`$1`).
///
/// `NaN` numerics read as NULL so one bad variant cannot fail the strip.
const CANDIDATES_SQL: &str = r"
    SELECT v.id::bigint AS variant_id,
           v.product_id::bigint AS product_id,
           p.type_id::bigint AS type_id,
           p.title,
           to_jsonb(p.image_urls) AS image_urls,
           NULLIF(v.price::numeric, 'NaN') AS price,
           NULLIF(v.discounted_price::numeric, 'NaN') AS discounted_price,
           NULLIF(v.discount_percent::numeric, 'NaN') AS discount_percent,
           NULLIF(v.stock_quantity::numeric, 'NaN')::bigint AS stock_quantity,
           COALESCE(v.pin_to_home_discount, FALSE) AS pinned,
           v.pinned_to_home_discount_at AS pinned_at,
           v.created_at,
           p.created_at AS product_created_at
    FROM product_variants v
    JOIN products p ON p.id = v.product_id
    WHERE NULLIF(v.discounted_price::numeric, 'NaN') IS NOT NULL
      AND (v.pin_to_home_discount IS TRUE
           OR NULLIF(v.discount_percent::numeric, 'NaN') >= $1)
";

/// A discounted variant joined to its product.
#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    variant_id: i64,
    product_id: i64,
    type_id: Option<i64>,
    title: Option<String>,
    image_urls: Option<serde_json::Value>,
    price: Option<Decimal>,
    discounted_price: Option<Decimal>,
    discount_percent: Option<Decimal>,
    stock_quantity: Option<i64>,
    pinned: bool,
    pinned_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    product_created_at: Option<DateTime<Utc>>,
}

impl From<CandidateRow> for DiscountCandidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            variant_id: VariantId::new(row.variant_id),
            product_id: ProductId::new(row.product_id),
            category_id: CategoryId::from_nullable(row.type_id),
            title: row.title.unwrap_or_default(),
            image_urls: row.image_urls.as_ref().map(image_list).unwrap_or_default(),
            price: row.price,
            discounted_price: row.discounted_price,
            discount_percent: row.discount_percent,
            stock_quantity: row.stock_quantity,
            pinned: row.pinned,
            pinned_at: row.pinned_at,
            created_at: row.created_at,
            product_created_at: row.product_created_at,
        }
    }
}

/// Repository for discount candidate reads.
pub struct DiscountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DiscountRepository<'a> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Variants with a discounted price that are pinned or discounted by at
    /// least `auto_min_percent`.
    ///
    /// Stock and per-product selection are left to the composer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn candidates(
        &self,
        auto_min_percent: Decimal,
    ) -> Result<Vec<DiscountCandidate>, RepositoryError> {
        let rows = sqlx::query_as::<_, CandidateRow>(CANDIDATES_SQL)
            .bind(auto_min_percent)
            .fetch_all(self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "fetched discount candidates");

        Ok(rows.into_iter().map(DiscountCandidate::from).collect())
    }
}
