//! HTTP handlers for the gateway server

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{debug, error, warn};
use transferdesk_core::{ConnectionRepository, TestRequest};
use uuid::Uuid;

use crate::services::ConnectionTester;

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub tester: Arc<ConnectionTester>,
    pub connections: Arc<dyn ConnectionRepository>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of every non-outcome failure response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// `details` of a 500 caused by a request that could not be processed
pub const UNEXPECTED_ERROR_DETAILS: &str =
    "An unexpected error occurred while testing the connection";

fn internal_error(error: impl Into<String>, details: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.into(),
            details: Some(details.into()),
        }),
    )
        .into_response()
}

fn connection_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Connection not found".to_string(),
            details: None,
        }),
    )
        .into_response()
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Summary of a body parse failure. serde's text can quote field values,
/// which may be secrets, so it is not passed through.
fn describe_parse_error(error: &serde_json::Error) -> &'static str {
    use serde_json::error::Category;
    match error.classify() {
        Category::Syntax | Category::Eof => "Malformed JSON body",
        Category::Data => "Request body does not match the expected fields",
        Category::Io => "Failed to read request body",
    }
}

/// POST /test-connection
///
/// Tests the connection described by the body. The result is persisted only
/// when the body carries an `id`. The body is parsed as JSON whatever its
/// `Content-Type`; browser `fetch` calls with a string body send `text/plain`.
pub async fn test_connection(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("[Gateway] Failed to read test request body: {}", rejection);
            return internal_error("Failed to read request body", UNEXPECTED_ERROR_DETAILS);
        }
    };

    let request = match serde_json::from_slice::<TestRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            let reason = describe_parse_error(&e);
            warn!("[Gateway] Rejected test request: {}", reason);
            return internal_error(reason, UNEXPECTED_ERROR_DETAILS);
        }
    };

    Json(state.tester.test(request).await).into_response()
}

/// OPTIONS /test-connection
///
/// Empty 200. With CORS enabled the CORS layer answers OPTIONS before this
/// handler is reached.
pub async fn test_connection_preflight() -> StatusCode {
    StatusCode::OK
}

/// POST /connections/{id}/test
///
/// Tests a stored connection and persists the result.
pub async fn test_stored_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return connection_not_found();
    };

    match state.connections.get(&id).await {
        Ok(Some(record)) => {
            let outcome = state.tester.test(TestRequest::from_record(&record)).await;
            Json(outcome).into_response()
        }
        Ok(None) => connection_not_found(),
        Err(e) => {
            error!("[Gateway] Failed to load connection {}: {:#}", id, e);
            internal_error("Failed to load connection", format!("{:#}", e))
        }
    }
}

/// Response for a panicking handler (tower-http `CatchPanicLayer`)
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("[Gateway] Handler panicked: {}", detail);

    internal_error("Internal server error", UNEXPECTED_ERROR_DETAILS)
}
