//! Product type routes.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::error::{Result, UpstreamContext};
use crate::models::TypesResponse;
use crate::state::AppState;

/// Create the types router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}

/// Product types with their attributes.
#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<TypesResponse>> {
    let types = state
        .categories()
        .get_or_load(state.pool())
        .await
        .upstream("Failed to fetch product types")?;

    Ok(Json(TypesResponse {
        types: types.as_ref().clone(),
    }))
}
