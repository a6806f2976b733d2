//! Request dispatch.
//!
//! # Routing Order
//! ```text
//! OPTIONS                 → 204 preflight            (strict CORS)
//! GET with ?fetch=<url>   → fetch-proxy JSON         (permissive CORS)
//! anything but POST       → 405 Method not allowed   (strict CORS)
//! POST over the limit     → 429 Too many requests    (strict CORS)
//! POST                    → chat-proxy passthrough   (strict CORS)
//! ```
//!
//! The path is never consulted; every route above applies to any path.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;

use crate::http::request::{client_id, fetch_target, request_id};
use crate::http::server::AppState;
use crate::http::{chat_proxy, fetch_proxy, response};
use crate::observability::metrics;
use crate::security::CorsPolicy;

/// Which branch handled a request; used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Fetch,
    MethodNotAllowed,
    RateLimited,
    Chat,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::Fetch => "fetch",
            Route::MethodNotAllowed => "method_not_allowed",
            Route::RateLimited => "rate_limited",
            Route::Chat => "chat",
        }
    }
}

/// Single entry point for every inbound request.
pub async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (route, response) = dispatch(&state, request).await;
    metrics::record_request(route.as_str(), response.status().as_u16(), start_time);
    response
}

/// Pick a branch and run it.
pub async fn dispatch(state: &AppState, request: Request<Body>) -> (Route, Response) {
    let strict = state.cors.headers_for(CorsPolicy::Strict, request.headers());
    let method = request.method().clone();
    let req_id = request_id(request.headers()).to_string();

    tracing::debug!(
        request_id = %req_id,
        method = %method,
        path = %request.uri().path(),
        "Dispatching request"
    );

    if method == Method::OPTIONS {
        return (Route::Preflight, response::preflight(strict));
    }

    if method == Method::GET {
        if let Some(target) = fetch_target(request.uri().query()) {
            let response = fetch_proxy::handle(&state.client, &state.fetch, &target).await;
            return (Route::Fetch, response);
        }
    }

    if method != Method::POST {
        return (
            Route::MethodNotAllowed,
            response::text(StatusCode::METHOD_NOT_ALLOWED, strict, "Method not allowed"),
        );
    }

    let client = client_id(request.headers(), &state.client_ip_header);
    if !state.rate_limiter.admit(&client).is_allowed() {
        tracing::warn!(request_id = %req_id, client = %client, "Rate limit exceeded");
        metrics::record_rate_limited("fixed_window");
        return (
            Route::RateLimited,
            response::text(StatusCode::TOO_MANY_REQUESTS, strict, "Too many requests"),
        );
    }

    let response = chat_proxy::handle(
        &state.client,
        &state.upstream,
        state.chat_limits,
        request.into_body(),
        strict,
        &req_id,
    )
    .await;
    (Route::Chat, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelayConfig;
    use crate::http::server::RelayServer;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
    use tower::ServiceExt;

    fn server(config: RelayConfig) -> RelayServer {
        RelayServer::new(config)
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_preflight_allowed_origin() {
        let app = server(RelayConfig::default()).router();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .header("origin", "https://en.wikipedia.org")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://en.wikipedia.org");
        assert_eq!(res.headers()["vary"], "Origin");
        assert!(body_string(res).await.is_empty());
    }

    #[tokio::test]
    async fn test_preflight_foreign_origin() {
        let app = server(RelayConfig::default()).router();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/any/path")
            .header("origin", "https://evil.com")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_invalid_fetch_target() {
        let app = server(RelayConfig::default()).router();
        for uri in ["/?fetch=notaurl", "/?fetch="] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let res = app.clone().oneshot(req).await.unwrap();

            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
            assert_eq!(body_string(res).await, r#"{"error":"Invalid URL"}"#);
        }
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let app = server(RelayConfig::default()).router();
        for (method, uri) in [(Method::GET, "/"), (Method::PUT, "/"), (Method::DELETE, "/?fetch=http://x")] {
            let req = Request::builder()
                .method(method.clone())
                .uri(uri)
                .header("origin", "https://www.wikipedia.org")
                .body(Body::empty())
                .unwrap();
            let res = app.clone().oneshot(req).await.unwrap();

            assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
            assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://www.wikipedia.org");
            assert_eq!(body_string(res).await, "Method not allowed");
        }
    }

    #[tokio::test]
    async fn test_rate_limit_before_upstream() {
        let mut config = RelayConfig::default();
        config.rate_limit.max_requests = 1;
        // No credential: an admitted request stops at 503 without touching the network.
        config.upstream.api_key = None;
        let relay = server(config);
        let app = relay.router();

        let post = || {
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header("cf-connecting-ip", "198.51.100.1")
                .body(Body::from("{}"))
                .unwrap()
        };

        let first = app.clone().oneshot(post()).await.unwrap();
        assert_eq!(first.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_string(first).await,
            r#"{"error":"Upstream credential not configured"}"#
        );

        let second = app.clone().oneshot(post()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_string(second).await, "Too many requests");

        // A different client still gets through.
        let other = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();
        let res = app.oneshot(other).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(relay.rate_limiter().usage("unknown").unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = server(RelayConfig::default()).router();
        let req = Request::builder().method(Method::OPTIONS).uri("/").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let id = res.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }
}
