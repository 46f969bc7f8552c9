//! HTTP Request/Response Logging Middleware
//!
//! One entry and one exit line per request, correlated by trace id.
//! Bodies are never logged: test requests carry passwords and consumer secrets.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use tracing::{debug, Instrument};

use crate::logging::{RequestSpan, TraceContext};

/// Headers that should be redacted
const SENSITIVE_HEADERS: &[&str] = &["authorization", "apikey", "cookie", "set-cookie", "x-api-key"];

/// Headers worth showing at DEBUG level
const LOGGED_HEADERS: &[&str] = &[
    "content-type",
    "origin",
    "user-agent",
    "x-client-info",
    "authorization",
    "apikey",
];

/// Compact header summary with secrets redacted
pub fn redact_headers_compact(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| LOGGED_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| {
            if SENSITIVE_HEADERS.contains(&name.as_str()) {
                format!("{}=[REDACTED]", name)
            } else {
                format!("{}={:?}", name, value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Logging middleware for requests and responses
pub async fn http_logging_middleware(request: Request, next: Next) -> Response {
    let ctx = TraceContext::new(request.method().as_str(), request.uri().path());
    let span = RequestSpan::enter(&ctx);

    async move {
        RequestSpan::log_entry(&ctx);
        debug!(
            trace_id = %ctx.trace_id,
            headers = %redact_headers_compact(request.headers()),
            "Request headers"
        );

        let response = next.run(request).await;

        RequestSpan::log_exit(&ctx, response.status().as_u16());
        response
    }
    .instrument(span)
    .await
}
