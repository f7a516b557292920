//! Viewer identity extractor.
//!
//! A signed-in user is identified by the bearer token in `Authorization`.
//! Everyone also gets a visitor id kept in the session, which keys views
//! when no user is known.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::session_keys;
use crate::services::identity::bearer_token;
use crate::state::AppState;

/// Who is viewing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// Deduplication key: the user id, else the visitor id.
    pub key: String,
    /// Signed-in user, if the bearer token resolved.
    pub user_id: Option<String>,
}

impl Viewer {
    fn new(visitor_id: String, user_id: Option<String>) -> Self {
        Self {
            key: user_id.clone().unwrap_or(visitor_id),
            user_id,
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let visitor_id = visitor_id(&session).await?;
        let user_id = resolve_user(parts, state).await;

        Ok(Self::new(visitor_id, user_id))
    }
}

/// Read the visitor id from the session, minting one on first contact.
async fn visitor_id(session: &Session) -> Result<String, AppError> {
    if let Some(existing) = session.get::<String>(session_keys::VISITOR_ID).await? {
        return Ok(existing);
    }

    let fresh = Uuid::new_v4().to_string();
    session.insert(session_keys::VISITOR_ID, &fresh).await?;
    Ok(fresh)
}

/// Resolve the bearer token to a user id. Lookup failures count as anonymous.
async fn resolve_user(parts: &Parts, state: &AppState) -> Option<String> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)?;

    let identity = state.identity()?;

    match identity.user_id(token).await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!(error = %e, "identity lookup failed, treating viewer as anonymous");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_wins_as_key() {
        let viewer = Viewer::new("visitor-1".to_string(), Some("user-9".to_string()));
        assert_eq!(viewer.key, "user-9");
        assert_eq!(viewer.user_id.as_deref(), Some("user-9"));
    }

    #[test]
    fn test_anonymous_uses_visitor_id() {
        let viewer = Viewer::new("visitor-1".to_string(), None);
        assert_eq!(viewer.key, "visitor-1");
        assert!(viewer.user_id.is_none());
    }
}
