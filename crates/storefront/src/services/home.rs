//! Homepage discount strip.

use sqlx::PgPool;
use tracing::instrument;

use mazin_core::ranking::{DiscountPickerConfig, pick_home_discounts};

use crate::db::{DiscountRepository, RepositoryError};
use crate::models::HomeDiscountCard;

/// Compose the discount strip.
///
/// `requested` is the raw `limit` parameter; zero or missing uses the
/// configured limit.
///
/// # Errors
///
/// Returns `RepositoryError` if the candidate read fails.
#[instrument(skip(pool, config))]
pub async fn discounted_cards(
    pool: &PgPool,
    config: &DiscountPickerConfig,
    requested: Option<usize>,
) -> Result<Vec<HomeDiscountCard>, RepositoryError> {
    let limit = config.effective_limit(requested);
    let candidates = DiscountRepository::new(pool)
        .candidates(config.auto_min_percent)
        .await?;

    let picked = pick_home_discounts(&candidates, limit, config);
    tracing::debug!(
        candidates = candidates.len(),
        picked = picked.len(),
        limit,
        "composed home discounts"
    );

    Ok(picked
        .into_iter()
        .map(|candidate| HomeDiscountCard::from_candidate(candidate, config))
        .collect())
}
