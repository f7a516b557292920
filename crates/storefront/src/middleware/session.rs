//! Session middleware configuration.
//!
//! Sessions only carry the anonymous visitor id used to deduplicate product
//! views, so they live for a year of inactivity.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "mazin_session";

/// Session expiry time in seconds (365 days).
const SESSION_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Create the `PostgreSQL` session store and its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session schema cannot be created.
pub async fn create_session_store(pool: &PgPool) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer over a `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
