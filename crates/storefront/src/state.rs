//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{CategoryCache, IdentityClient, IdentityError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    identity: Option<IdentityClient>,
    categories: CategoryCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the identity client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, IdentityError> {
        let identity = config.identity.as_ref().map(IdentityClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                categories: CategoryCache::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the identity client, if one is configured.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityClient> {
        self.inner.identity.as_ref()
    }

    /// Get the category cache.
    #[must_use]
    pub fn categories(&self) -> &CategoryCache {
        &self.inner.categories
    }
}
