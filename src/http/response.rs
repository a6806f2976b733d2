//! Response construction.
//!
//! # Responsibilities
//! - Attach the route's CORS header set to every response
//! - Build the plain-text and JSON bodies the dispatcher returns
//! - Stream the chat upstream's body back without buffering
//!
//! # Design Decisions
//! - Only the upstream `content-type` crosses over; all other upstream
//!   headers are dropped in favour of the strict CORS set

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// 204 preflight answer with no body.
pub fn preflight(cors: HeaderMap) -> Response {
    (StatusCode::NO_CONTENT, cors).into_response()
}

/// Plain-text response, e.g. `405 Method not allowed`.
pub fn text(status: StatusCode, cors: HeaderMap, body: &'static str) -> Response {
    (status, cors, body).into_response()
}

/// `{"content": ...}` with the given headers.
pub fn json_content(cors: HeaderMap, content: String) -> Response {
    (StatusCode::OK, cors, Json(json!({ "content": content }))).into_response()
}

/// `{"error": ...}` with the given status and headers.
pub fn json_error(status: StatusCode, cors: HeaderMap, message: impl Into<String>) -> Response {
    (status, cors, Json(json!({ "error": message.into() }))).into_response()
}

/// Pass an upstream response through: same status, streamed body, CORS
/// headers plus the upstream content type.
pub fn passthrough(upstream: reqwest::Response, mut cors: HeaderMap) -> Response {
    let status = upstream.status();
    if let Some(content_type) = upstream.headers().get(CONTENT_TYPE) {
        cors.insert(CONTENT_TYPE, content_type.clone());
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = cors;
    response
}
