//! Request inspection helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Derive the rate-limit client id from the trusted edge header
//! - Pull the fetch-proxy target out of the query string

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID, in and out.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Client id used when the trusted IP header is missing.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Query parameter selecting the fetch-proxy.
pub const FETCH_PARAM: &str = "fetch";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRelayRequestId;

impl MakeRequestId for MakeRelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID set by the request-id layer, for log fields.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Rate-limit key: the trusted connecting-IP header, or `"unknown"`.
pub fn client_id(headers: &HeaderMap, ip_header: &HeaderName) -> String {
    headers
        .get(ip_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// First `fetch` query value, percent-decoded. `Some("")` when the parameter
/// is present without a value.
pub fn fetch_target(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == FETCH_PARAM)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_target_decodes_first_value() {
        assert_eq!(
            fetch_target(Some("fetch=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&fetch=second")),
            Some("https://example.com/a?b=1".to_string())
        );
    }

    #[test]
    fn test_fetch_target_presence() {
        assert_eq!(fetch_target(None), None);
        assert_eq!(fetch_target(Some("other=1")), None);
        assert_eq!(fetch_target(Some("fetch")), Some(String::new()));
        assert_eq!(fetch_target(Some("fetch=")), Some(String::new()));
    }

    #[test]
    fn test_client_id_falls_back_to_unknown() {
        let header = HeaderName::from_static("cf-connecting-ip");
        let mut headers = HeaderMap::new();
        assert_eq!(client_id(&headers, &header), "unknown");

        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(client_id(&headers, &header), "203.0.113.7");

        headers.insert("cf-connecting-ip", HeaderValue::from_static(""));
        assert_eq!(client_id(&headers, &header), "unknown");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let req = Request::new(());
        let mut make = MakeRelayRequestId;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
