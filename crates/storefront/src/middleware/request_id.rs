//! Request ID middleware for request correlation.
//!
//! An `x-request-id` from the edge proxy is reused when it looks sane,
//! otherwise a UUID v4 is minted. The id is recorded on the tracing span,
//! tagged on the Sentry scope and echoed back to the client.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is trusted.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Pick the upstream request id if it is non-empty and reasonably short.
fn upstream_request_id(value: Option<&HeaderValue>) -> Option<String> {
    value
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = upstream_request_id(request.headers().get(REQUEST_ID_HEADER))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_request_id() {
        let ok = HeaderValue::from_static("edge-123");
        assert_eq!(upstream_request_id(Some(&ok)).as_deref(), Some("edge-123"));

        let blank = HeaderValue::from_static("   ");
        assert_eq!(upstream_request_id(Some(&blank)), None);
        assert_eq!(upstream_request_id(None), None);

        let long = HeaderValue::from_str(&"x".repeat(MAX_REQUEST_ID_LEN + 1)).unwrap_or(blank);
        assert_eq!(upstream_request_id(Some(&long)), None);
    }
}
