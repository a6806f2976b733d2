//! Chat-completion proxy.
//!
//! Forwards the inbound body untouched to the configured upstream with the
//! server-held bearer credential, then streams the upstream answer back.
//! Upstream status codes and bodies are never rewritten.
//!
//! Failures that happen before the upstream answers are rendered here, under
//! the same strict CORS set as a passthrough.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use futures_util::StreamExt;
use thiserror::Error;

use crate::config::{RelayConfig, UpstreamConfig};
use crate::http::response;

#[derive(Debug, Error)]
pub enum ChatProxyError {
    #[error("Upstream credential not configured")]
    MissingCredential,

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("Request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Upstream did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

/// Bounds applied to one chat exchange.
#[derive(Debug, Clone, Copy)]
pub struct ChatLimits {
    pub max_body_size: usize,
    /// Time allowed until the upstream response head arrives. The streamed
    /// body is never cut off.
    pub deadline: Option<Duration>,
}

impl ChatLimits {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            max_body_size: config.security.max_body_size,
            deadline: config.timeouts.chat_secs.map(Duration::from_secs),
        }
    }
}

impl ChatProxyError {
    fn respond(self, cors: HeaderMap) -> Response {
        match self {
            ChatProxyError::MissingCredential => {
                response::json_error(StatusCode::SERVICE_UNAVAILABLE, cors, self.to_string())
            }
            ChatProxyError::Body(_) => {
                response::text(StatusCode::BAD_REQUEST, cors, "Failed to read request body")
            }
            ChatProxyError::TooLarge { .. } => {
                response::text(StatusCode::PAYLOAD_TOO_LARGE, cors, "Request body too large")
            }
            ChatProxyError::Timeout(_) => {
                response::text(StatusCode::GATEWAY_TIMEOUT, cors, "Upstream request timed out")
            }
            ChatProxyError::Upstream(_) => {
                response::text(StatusCode::BAD_GATEWAY, cors, "Upstream request failed")
            }
        }
    }
}

/// POST `body` verbatim to the chat upstream.
pub async fn forward(
    client: &reqwest::Client,
    upstream: &UpstreamConfig,
    body: Bytes,
) -> Result<reqwest::Response, ChatProxyError> {
    let api_key = upstream
        .api_key
        .as_deref()
        .ok_or(ChatProxyError::MissingCredential)?;

    let response = client
        .post(&upstream.chat_url)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {}", api_key))
        .body(body)
        .send()
        .await?;

    Ok(response)
}

/// Read the inbound body, forward it, and relay the answer under `cors`.
pub async fn handle(
    client: &reqwest::Client,
    upstream: &UpstreamConfig,
    limits: ChatLimits,
    body: Body,
    cors: HeaderMap,
    request_id: &str,
) -> Response {
    let exchange = read_and_forward(client, upstream, limits.max_body_size, body, request_id);
    let outcome = match limits.deadline {
        Some(deadline) => tokio::time::timeout(deadline, exchange)
            .await
            .unwrap_or(Err(ChatProxyError::Timeout(deadline))),
        None => exchange.await,
    };

    match outcome {
        Ok(upstream_response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %upstream_response.status(),
                "Chat upstream responded"
            );
            response::passthrough(upstream_response, cors)
        }
        Err(e @ ChatProxyError::TooLarge { .. }) => {
            tracing::warn!(request_id = %request_id, error = %e, "Chat request rejected");
            e.respond(cors)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Chat proxy failed");
            e.respond(cors)
        }
    }
}

async fn read_and_forward(
    client: &reqwest::Client,
    upstream: &UpstreamConfig,
    max_body_size: usize,
    body: Body,
    request_id: &str,
) -> Result<reqwest::Response, ChatProxyError> {
    let bytes = read_body(body, max_body_size).await?;
    tracing::debug!(request_id = %request_id, body_bytes = bytes.len(), "Forwarding chat request");
    forward(client, upstream, bytes).await
}

/// Buffer the inbound body, giving up as soon as it passes `limit` bytes.
/// Applies equally to sized and chunked bodies.
pub async fn read_body(body: Body, limit: usize) -> Result<Bytes, ChatProxyError> {
    let mut stream = body.into_data_stream();
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Err(ChatProxyError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buf))
}
