//! Product listing, stats and view tracking routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use mazin_core::ProductId;

use super::params::{LimitQuery, ProductsQuery, clamp_limit};
use crate::db::{ProductRepository, ViewRepository};
use crate::error::{AppError, Result, UpstreamContext};
use crate::middleware::Viewer;
use crate::models::{MostViewedResponse, PriceStatsBody, ProductsResponse, ViewRecorded};
use crate::services::CatalogService;
use crate::state::AppState;

/// Default number of most viewed products.
const MOST_VIEWED_DEFAULT: usize = 10;

/// Hard cap on most viewed products.
const MOST_VIEWED_MAX: usize = 30;

/// Create the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/stats", get(stats))
        .route("/view", post(record_view))
        .route("/most-viewed", get(most_viewed))
}

/// List products for a category or search page.
#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductsResponse>> {
    let ranking = &state.config().ranking;
    let params = query.into_params(ranking.max_limit);

    let response = CatalogService::new(state.pool(), ranking)
        .list(&params)
        .await
        .upstream("Failed to fetch products")?;

    Ok(Json(response))
}

/// Price envelope for a category or search page.
#[instrument(skip(state))]
async fn stats(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<PriceStatsBody>> {
    let ranking = &state.config().ranking;
    let params = query.into_params(ranking.max_limit);

    let stats = CatalogService::new(state.pool(), ranking)
        .price_stats(&params)
        .await
        .upstream("Failed to fetch price stats")?;

    Ok(Json(PriceStatsBody::from(stats)))
}

/// Body of `POST /api/products/view`.
#[derive(Debug, Deserialize)]
pub struct ViewBody {
    #[serde(default, rename = "productId")]
    pub product_id: Option<serde_json::Value>,
}

impl ViewBody {
    /// The product id, accepting numbers and numeric strings.
    fn product_id(&self) -> Option<ProductId> {
        let raw = match self.product_id.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64()?,
            serde_json::Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (raw > 0).then(|| ProductId::new(raw))
    }
}

/// Record a product view, at most once per viewer per day.
#[instrument(skip(state, viewer, body))]
async fn record_view(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(body): Json<ViewBody>,
) -> Result<Json<ViewRecorded>> {
    let product = body
        .product_id()
        .ok_or_else(|| AppError::BadRequest("Invalid productId".to_string()))?;

    let inserted = ViewRepository::new(state.pool())
        .record(product, &viewer.key, viewer.user_id.as_deref())
        .await
        .upstream("Failed to record view")?;

    tracing::debug!(%product, inserted, signed_in = viewer.user_id.is_some(), "product view");

    Ok(Json(ViewRecorded { success: true }))
}

/// Products ranked by recent views.
#[instrument(skip(state))]
async fn most_viewed(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<MostViewedResponse>> {
    let limit = clamp_limit(query.limit, MOST_VIEWED_DEFAULT, MOST_VIEWED_MAX);

    let products = ProductRepository::new(state.pool())
        .most_viewed(i32::try_from(limit).unwrap_or(i32::MAX))
        .await
        .upstream("Failed to fetch most viewed products")?;

    Ok(Json(MostViewedResponse { products }))
}
