//! Product categories (`types`) with their attributes.

use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;

/// Repository for category reads.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Call `get_types_with_details`.
    ///
    /// Each entry is `{id, created_at, typename, attributes}`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the call fails.
    #[instrument(skip(self))]
    pub async fn with_details(&self) -> Result<Vec<serde_json::Value>, RepositoryError> {
        let rows: Vec<serde_json::Value> =
            sqlx::query_scalar("SELECT to_jsonb(t) FROM get_types_with_details() AS t")
                .fetch_all(self.pool)
                .await?;

        Ok(rows)
    }
}
