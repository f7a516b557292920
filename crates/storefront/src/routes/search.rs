//! Search suggestion route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use super::params::{DEFAULT_LIMIT, clamp_limit, lenient};
use crate::db::ProductRepository;
use crate::error::{Result, UpstreamContext};
use crate::models::SearchResponse;
use crate::state::AppState;

/// Shortest query that is worth a database round trip.
const MIN_QUERY_CHARS: usize = 2;

/// Hard cap on suggestions.
const SEARCH_MAX_LIMIT: usize = 100;

/// Search suggestions query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<i64>,
}

impl SuggestQuery {
    /// Trimmed query, or `None` when too short to search.
    fn term(&self) -> Option<&str> {
        let term = self.q.trim();
        (term.chars().count() >= MIN_QUERY_CHARS).then_some(term)
    }
}

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(suggest))
}

/// Products whose title or code contains the query.
#[instrument(skip(state))]
async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SearchResponse>> {
    let Some(term) = query.term() else {
        return Ok(Json(SearchResponse {
            products: Vec::new(),
        }));
    };

    let limit = clamp_limit(query.limit, DEFAULT_LIMIT, SEARCH_MAX_LIMIT);
    let products = ProductRepository::new(state.pool())
        .search(term, i64::try_from(limit).unwrap_or(i64::MAX))
        .await
        .upstream("Search failed")?;

    tracing::debug!(term, results = products.len(), "search suggestions");

    Ok(Json(SearchResponse { products }))
}
