//! Request ID middleware for request tracing and correlation.
//!
//! Generates a UUID v4 for each request unless an upstream proxy supplied a
//! usable one. The request ID is:
//! - Recorded in the current tracing span
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID we pass through.
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Pick the upstream request ID if it is printable and short, else mint one.
fn resolve_request_id(upstream: Option<&HeaderValue>) -> String {
    upstream
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LENGTH)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers().get(REQUEST_ID_HEADER));

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
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_upstream_id() {
        let header = HeaderValue::from_static("cf-7f3a9b");
        assert_eq!(resolve_request_id(Some(&header)), "cf-7f3a9b");
    }

    #[test]
    fn test_generates_when_missing_or_oversized() {
        assert_eq!(resolve_request_id(None).len(), 36);

        let long = HeaderValue::from_str(&"a".repeat(MAX_REQUEST_ID_LENGTH + 1)).unwrap();
        assert_eq!(resolve_request_id(Some(&long)).len(), 36);

        let blank = HeaderValue::from_static("  ");
        assert_eq!(resolve_request_id(Some(&blank)).len(), 36);
    }
}
