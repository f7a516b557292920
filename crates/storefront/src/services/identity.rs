//! Identity provider client.
//!
//! Resolves a bearer access token to the id of the signed-in user. Only the
//! user lookup endpoint is used; sign-in flows live in the frontend.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::IdentityConfig;

/// Request timeout for identity lookups.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when interacting with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Configuration could not be turned into a client.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    user_url: Url,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Option<String>,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| IdentityError::Config(format!("Invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let user_url = config
            .url
            .join("auth/v1/user")
            .map_err(|e| IdentityError::Config(e.to_string()))?;

        Ok(Self { client, user_url })
    }

    /// Look up the user behind an access token.
    ///
    /// Returns `Ok(None)` when the provider rejects the token.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider answers with an
    /// unexpected status.
    #[instrument(skip(self, access_token))]
    pub async fn user_id(&self, access_token: &str) -> Result<Option<String>, IdentityError> {
        let response = self
            .client
            .get(self.user_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let user: UserResponse = response.json().await?;
        Ok(user.id.filter(|id| !id.is_empty()))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
