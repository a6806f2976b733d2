//! CORS response headers.
//!
//! Two policies exist side by side and are picked per route:
//! - `Strict`: preflight, method rejection, rate limiting and the chat-proxy.
//!   Only allowlisted origins are echoed back; anything else gets no
//!   `Access-Control-Allow-Origin` at all.
//! - `Permissive`: the read-only fetch-proxy. Any origin, fixed headers.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue};

const STRICT_METHODS: &str = "POST, OPTIONS";
const PERMISSIVE_METHODS: &str = "GET, POST, OPTIONS";
const DEFAULT_ALLOW_HEADERS: &str = "Content-Type";

/// Which header set a route answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsPolicy {
    Strict,
    Permissive,
}

/// Origin allowlist for the strict policy.
#[derive(Debug, Clone)]
pub struct CorsRules {
    allowed_origins: Vec<String>,
}

impl CorsRules {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }

    /// Headers for `policy`, given the inbound request headers.
    pub fn headers_for(&self, policy: CorsPolicy, request: &HeaderMap) -> HeaderMap {
        match policy {
            CorsPolicy::Strict => self.strict_headers(
                request.get(ORIGIN).and_then(|v| v.to_str().ok()),
                request.get(ACCESS_CONTROL_REQUEST_HEADERS),
            ),
            CorsPolicy::Permissive => permissive_headers(),
        }
    }

    /// Strict header set. Requested headers are echoed verbatim, defaulting
    /// to `Content-Type`.
    pub fn strict_headers(
        &self,
        origin: Option<&str>,
        requested_headers: Option<&HeaderValue>,
    ) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(STRICT_METHODS));
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            requested_headers
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOW_HEADERS)),
        );
        headers.insert(VARY, HeaderValue::from_static("Origin"));

        if let Some(origin) = origin.filter(|o| self.is_allowed(o)) {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
        }
        headers
    }
}

/// Permissive header set used by the fetch-proxy.
pub fn permissive_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(PERMISSIVE_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(DEFAULT_ALLOW_HEADERS));
    headers
}
