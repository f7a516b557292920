//! Cached product categories.
//!
//! Categories change rarely, so the procedure result is kept in memory for an
//! hour (`moka`).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::db::{CategoryRepository, RepositoryError};

/// How long a category list is served from memory.
const CATEGORY_TTL: Duration = Duration::from_secs(60 * 60);

/// In-memory cache in front of `get_types_with_details`.
#[derive(Clone)]
pub struct CategoryCache {
    cache: Cache<(), Arc<Vec<serde_json::Value>>>,
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new(CATEGORY_TTL)
    }
}

impl CategoryCache {
    /// Create a cache with the given time to live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Return cached categories, loading them on a miss.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if loading fails. Failures are not cached.
    pub async fn get_or_load(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<serde_json::Value>>, RepositoryError> {
        if let Some(types) = self.cache.get(&()).await {
            return Ok(types);
        }

        let types = Arc::new(CategoryRepository::new(pool).with_details().await?);
        self.cache.insert((), Arc::clone(&types)).await;
        tracing::debug!(count = types.len(), "category cache refreshed");

        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_serves_inserted_value() {
        let cache = CategoryCache::default();
        assert!(cache.cache.get(&()).await.is_none());

        let types = Arc::new(vec![serde_json::json!({"id": 1, "typename": "Mugs"})]);
        cache.cache.insert((), Arc::clone(&types)).await;
        assert_eq!(cache.cache.get(&()).await, Some(types));
    }
}
