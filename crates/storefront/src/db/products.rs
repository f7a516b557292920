//! Product repository: listing snapshots, filtered listings and search.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use mazin_core::ranking::{ListingProduct, ListingVariant};
use mazin_core::{CategoryId, PriceStats, ProductId, SortMode};

use super::{RepositoryError, image_list};

/// Arguments of the `get_products_filtered` procedure.
#[derive(Debug, Clone)]
pub struct FilteredListing {
    pub category: Option<CategoryId>,
    pub filters: serde_json::Value,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortMode,
    pub limit: i32,
    pub offset: i32,
}

/// A product row with its variants aggregated as JSON.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    title: Option<String>,
    product_code: Option<String>,
    type_id: Option<i64>,
    image_urls: Option<serde_json::Value>,
    created_at: Option<DateTime<Utc>>,
    variants: Json<Vec<ListingVariant>>,
}

impl From<ListingRow> for ListingProduct {
    fn from(row: ListingRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            title: row.title.unwrap_or_default(),
            product_code: row.product_code,
            category_id: CategoryId::from_nullable(row.type_id),
            image_urls: row.image_urls.as_ref().map(image_list).unwrap_or_default(),
            created_at: row.created_at,
            variants: row.variants.0,
        }
    }
}

/// A search suggestion, shaped like the catalog tables.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchHit {
    pub id: i64,
    pub title: Option<String>,
    pub product_code: Option<String>,
    pub type_id: Option<i64>,
    pub image_urls: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    /// `[{id, price}]`
    pub product_variants: serde_json::Value,
    /// `{id, typename}` or `null` for uncategorized products.
    pub types: Option<serde_json::Value>,
}

/// Repository for product reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read up to `limit` products with their variants, newest first.
    ///
    /// This is the candidate snapshot for the listing generator.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn listing_snapshot(
        &self,
        limit: i64,
    ) -> Result<Vec<ListingProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r"
            SELECT p.id::bigint AS id,
                   p.title,
                   p.product_code,
                   p.type_id::bigint AS type_id,
                   to_jsonb(p.image_urls) AS image_urls,
                   p.created_at,
                   COALESCE(
                       (
                           SELECT jsonb_agg(
                                      jsonb_build_object(
                                          'id', v.id,
                                          'price', v.price::text,
                                          'stock_quantity', v.stock_quantity,
                                          'attributes',
                                          COALESCE(to_jsonb(v.attributes), 'null'::jsonb)
                                      )
                                      ORDER BY v.id
                                  )
                           FROM product_variants v
                           WHERE v.product_id = p.id
                       ),
                       '[]'::jsonb
                   ) AS variants
            FROM products p
            ORDER BY p.created_at DESC NULLS LAST
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ListingProduct::from).collect())
    }

    /// Call `get_products_filtered` and return its `products` array.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the call fails.
    #[instrument(skip(self, params), fields(sort = params.sort.as_str(), limit = params.limit))]
    pub async fn filtered(
        &self,
        params: &FilteredListing,
    ) -> Result<Vec<serde_json::Value>, RepositoryError> {
        let result: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            SELECT to_jsonb(get_products_filtered(
                p_type_id => $1,
                p_search => NULL,
                p_filters => $2,
                p_min_price => $3,
                p_max_price => $4,
                p_sort => $5,
                p_limit => $6,
                p_offset => $7
            ))
            ",
        )
        .bind(params.category.map(|c| c.as_i64()))
        .bind(&params.filters)
        .bind(params.min_price)
        .bind(params.max_price)
        .bind(params.sort.as_str())
        .bind(params.limit)
        .bind(params.offset)
        .fetch_one(self.pool)
        .await?;

        Ok(result
            .and_then(|mut value| value.get_mut("products").map(serde_json::Value::take))
            .and_then(|products| match products {
                serde_json::Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default())
    }

    /// Call `get_products_price_stats`. Missing values read as zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the call fails.
    #[instrument(skip(self, filters))]
    pub async fn price_stats(
        &self,
        category: Option<CategoryId>,
        filters: &serde_json::Value,
    ) -> Result<PriceStats, RepositoryError> {
        let result: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            SELECT to_jsonb(get_products_price_stats(
                p_type_id => $1,
                p_search => NULL,
                p_filters => $2
            ))
            ",
        )
        .bind(category.map(|c| c.as_i64()))
        .bind(filters)
        .fetch_one(self.pool)
        .await?;

        let field = |name: &str| {
            result
                .as_ref()
                .and_then(|value| value.get(name))
                .and_then(json_decimal)
                .unwrap_or_default()
        };

        Ok(PriceStats {
            min: field("min"),
            max: field("max"),
        })
    }

    /// Products whose title or code contains `term`, newest first.
    ///
    /// `%` and `_` in the term match literally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search(&self, term: &str, limit: i64) -> Result<Vec<SearchHit>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term));

        let hits = sqlx::query_as::<_, SearchHit>(
            r"
            SELECT p.id::bigint AS id,
                   p.title,
                   p.product_code,
                   p.type_id::bigint AS type_id,
                   to_jsonb(p.image_urls) AS image_urls,
                   p.created_at,
                   COALESCE(
                       (
                           SELECT jsonb_agg(
                                      jsonb_build_object(
                                          'id', v.id,
                                          'price', NULLIF(v.price::numeric, 'NaN')
                                      )
                                      ORDER BY v.id
                                  )
                           FROM product_variants v
                           WHERE v.product_id = p.id
                       ),
                       '[]'::jsonb
                   ) AS product_variants,
                   CASE WHEN t.id IS NULL THEN NULL
                        ELSE jsonb_build_object('id', t.id, 'typename', t.typename)
                   END AS types
            FROM products p
            LEFT JOIN types t ON t.id = p.type_id
            WHERE p.title ILIKE $1 ESCAPE '\' OR p.product_code ILIKE $1 ESCAPE '\'
            ORDER BY p.created_at DESC NULLS LAST
            LIMIT $2
            ",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(hits)
    }

    /// Call `get_most_viewed_products`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the call fails.
    #[instrument(skip(self))]
    pub async fn most_viewed(&self, limit: i32) -> Result<Vec<serde_json::Value>, RepositoryError> {
        let rows: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT to_jsonb(t) FROM get_most_viewed_products(p_limit => $1) AS t",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Read a decimal from a JSON number or numeric string.
fn json_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
