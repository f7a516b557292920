//! Homepage routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use tracing::instrument;

use super::params::LimitQuery;
use crate::error::{Result, UpstreamContext};
use crate::models::HomeDiscountsResponse;
use crate::services::home::discounted_cards;
use crate::state::AppState;

/// Create the home router.
pub fn router() -> Router<AppState> {
    Router::new().route("/discounted", get(discounted))
}

/// Discount strip for the homepage.
#[instrument(skip(state))]
async fn discounted(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<HomeDiscountsResponse>> {
    let requested = query.limit.and_then(|n| usize::try_from(n).ok());

    let products = discounted_cards(state.pool(), &state.config().ranking.discount, requested)
        .await
        .upstream("Failed to fetch discounted products")?;

    Ok(Json(HomeDiscountsResponse { products }))
}
