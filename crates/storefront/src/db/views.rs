//! Daily product view tracking.

use sqlx::PgPool;
use tracing::instrument;

use mazin_core::ProductId;

use super::RepositoryError;

/// Repository for product view writes.
pub struct ViewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ViewRepository<'a> {
    /// Create a new view repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a view of `product` by `viewer_key` for today.
    ///
    /// Repeat views on the same day are ignored. Returns whether a new row
    /// was written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, viewer_key, user_id))]
    pub async fn record(
        &self,
        product: ProductId,
        viewer_key: &str,
        user_id: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO product_daily_views (product_id, viewer_key, user_id)
            VALUES ($1, $2, $3::uuid)
            ON CONFLICT (product_id, viewer_key, viewed_on) DO NOTHING
            ",
        )
        .bind(product)
        .bind(viewer_key)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
