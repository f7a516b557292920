//! Unified error handling with Sentry integration.
//!
//! Every API failure renders as `{"error": "<message>"}`. Upstream failures
//! carry a fixed per-endpoint message so database details never reach the
//! client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A database read or write failed.
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Upstream { message, .. } => (*message).to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

/// Attach a client-facing message to a repository failure.
pub trait UpstreamContext<T> {
    /// Map the error to [`AppError::Upstream`] with `message`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upstream` when `self` is an error.
    fn upstream(self, message: &'static str) -> Result<T>;
}

impl<T> UpstreamContext<T> for std::result::Result<T, RepositoryError> {
    fn upstream(self, message: &'static str) -> Result<T> {
        self.map_err(|source| AppError::Upstream { message, source })
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
