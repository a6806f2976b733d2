//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single relay handler
//! - Wire up middleware (request ID, tracing)
//! - Own the shared state: HTTP client, rate limiter, CORS rules
//! - Run the rate-limit sweeper alongside the server
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::schema::DEFAULT_CLIENT_IP_HEADER;
use crate::config::{FetchConfig, RelayConfig, UpstreamConfig};
use crate::http::chat_proxy::ChatLimits;
use crate::http::dispatcher::relay_handler;
use crate::http::request::{request_id, MakeRelayRequestId};
use crate::security::{CorsRules, RateLimiter};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub rate_limiter: RateLimiter,
    pub cors: Arc<CorsRules>,
    pub fetch: Arc<FetchConfig>,
    pub upstream: Arc<UpstreamConfig>,
    pub chat_limits: ChatLimits,
    pub client_ip_header: HeaderName,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
    rate_limiter: RateLimiter,
}

impl RelayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);
        let client_ip_header = HeaderName::from_bytes(config.rate_limit.client_ip_header.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static(DEFAULT_CLIENT_IP_HEADER));

        let state = AppState {
            client: reqwest::Client::new(),
            rate_limiter: rate_limiter.clone(),
            cors: Arc::new(CorsRules::new(config.cors.allowed_origins.clone())),
            fetch: Arc::new(config.fetch.clone()),
            upstream: Arc::new(config.upstream.clone()),
            chat_limits: ChatLimits::from_config(&config),
            client_ip_header,
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            rate_limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Body size and deadline are enforced by the chat-proxy itself so that
    /// those rejections carry the strict CORS set.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request.headers()),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRelayRequestId))
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The shared rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            chat_url = %self.config.upstream.chat_url,
            rate_limit = self.config.rate_limit.max_requests,
            window_ms = self.config.rate_limit.window_ms,
            "HTTP server starting"
        );

        let sweeper = self.rate_limiter.clone().run_sweeper(
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            shutdown.resubscribe(),
        );
        tokio::spawn(sweeper);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
