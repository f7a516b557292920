//! Product listings and price stats.
//!
//! A non-empty search runs the in-process listing generator over a fresh
//! catalog snapshot. Without a search term the filtered listing procedure
//! does the work in the database.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use mazin_core::ranking::{ListingQuery, compose_listing};
use mazin_core::{CategoryId, PriceRange, PriceStats, SortMode};

use crate::config::RankingConfig;
use crate::db::RepositoryError;
use crate::db::products::{FilteredListing, ProductRepository};
use crate::models::{PriceStatsBody, ProductRecord, ProductsResponse};

/// Normalized listing request.
#[derive(Debug, Clone, Default)]
pub struct ListingParams {
    /// Trimmed search text.
    pub search: String,
    pub category: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortMode,
    /// Attribute filters for the filtered listing procedure.
    pub filters: serde_json::Value,
    pub limit: usize,
    pub offset: usize,
}

impl ListingParams {
    /// Whether the listing generator handles this request.
    #[must_use]
    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }

    fn listing_query(&self) -> ListingQuery {
        ListingQuery {
            search: self.search.clone(),
            primary_category: self.category,
            price_range: PriceRange::new(self.min_price, self.max_price),
            sort: self.sort,
        }
    }
}

/// Catalog listing operations.
pub struct CatalogService<'a> {
    pool: &'a PgPool,
    ranking: &'a RankingConfig,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, ranking: &'a RankingConfig) -> Self {
        Self { pool, ranking }
    }

    /// List products for a category or search page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog read fails.
    #[instrument(skip(self, params), fields(search = %params.search, category = ?params.category))]
    pub async fn list(&self, params: &ListingParams) -> Result<ProductsResponse, RepositoryError> {
        let products = ProductRepository::new(self.pool);

        if !params.has_search() {
            let rows = products
                .filtered(&FilteredListing {
                    category: params.category,
                    filters: params.filters.clone(),
                    min_price: params.min_price,
                    max_price: params.max_price,
                    sort: params.sort,
                    limit: clamp_i32(params.limit),
                    offset: clamp_i32(params.offset),
                })
                .await?;

            return Ok(ProductsResponse {
                products: rows.into_iter().map(ProductRecord::Raw).collect(),
                mixed: false,
                stats: None,
            });
        }

        let snapshot = products.listing_snapshot(self.ranking.fetch_cap).await?;
        let composed = compose_listing(&snapshot, &params.listing_query(), &self.ranking.listing);

        tracing::debug!(
            snapshot = snapshot.len(),
            composed = composed.items.len(),
            mixed = composed.mixed,
            "composed search listing"
        );

        Ok(ProductsResponse {
            products: composed
                .page(params.offset, params.limit)
                .cloned()
                .map(ProductRecord::Ranked)
                .collect(),
            mixed: composed.mixed,
            stats: Some(PriceStatsBody::from(composed.stats)),
        })
    }

    /// Price envelope for a category or search page.
    ///
    /// Price bounds and sort order never affect the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog read fails.
    #[instrument(skip(self, params), fields(search = %params.search, category = ?params.category))]
    pub async fn price_stats(&self, params: &ListingParams) -> Result<PriceStats, RepositoryError> {
        let products = ProductRepository::new(self.pool);

        if !params.has_search() {
            return products.price_stats(params.category, &params.filters).await;
        }

        let snapshot = products.listing_snapshot(self.ranking.fetch_cap).await?;
        let query = ListingQuery {
            search: params.search.clone(),
            primary_category: params.category,
            ..ListingQuery::default()
        };
        Ok(compose_listing(&snapshot, &query, &self.ranking.listing).stats)
    }
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
