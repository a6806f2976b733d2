//! Webpage fetch-proxy.
//!
//! `GET /?fetch=<url>` downloads the page with browser-like headers and
//! answers with its extracted text. Every outcome is JSON under the
//! permissive CORS set. Only a malformed target is a 400; upstream failures
//! are reported in the body of a 200.

use std::time::Duration;

use axum::http::header::{ACCEPT, USER_AGENT};
use axum::http::StatusCode;
use axum::response::Response;
use futures_util::StreamExt;
use thiserror::Error;

use crate::config::FetchConfig;
use crate::extract::extract_text_with_limit;
use crate::http::response;
use crate::security::cors::permissive_headers;

/// Why a fetch produced no content. `Display` is the client-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Source returned {0}")]
    SourceStatus(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("{0}")]
    Request(String),
}

impl FetchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::InvalidUrl => StatusCode::BAD_REQUEST,
            _ => StatusCode::OK,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Accept only non-empty targets that start with `http`.
pub fn validate_target(target: &str) -> Result<&str, FetchError> {
    if target.is_empty() || !target.starts_with("http") {
        return Err(FetchError::InvalidUrl);
    }
    Ok(target)
}

/// Download `target` and extract its text.
///
/// The deadline covers the whole exchange, body included. Only the first
/// `max_page_bytes` of the page are read.
pub async fn fetch_page(
    client: &reqwest::Client,
    config: &FetchConfig,
    target: &str,
) -> Result<String, FetchError> {
    let target = validate_target(target)?;

    let response = client
        .get(target)
        .timeout(Duration::from_millis(config.timeout_ms))
        .header(USER_AGENT, &config.user_agent)
        .header(ACCEPT, &config.accept)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::SourceStatus(status.as_u16()));
    }

    let html = read_capped(response, config.max_page_bytes).await?;
    Ok(extract_text_with_limit(&html, config.max_chars))
}

/// Read at most `limit` bytes of the body and stop the download there.
/// Invalid UTF-8, including a sequence cut at the limit, is replaced.
async fn read_capped(response: reqwest::Response, limit: usize) -> Result<String, FetchError> {
    let mut stream = response.bytes_stream();
    let mut page: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let room = limit - page.len();
        if chunk.len() >= room {
            page.extend_from_slice(&chunk[..room]);
            break;
        }
        page.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&page).into_owned())
}

/// Run the fetch-proxy and render its JSON response.
pub async fn handle(client: &reqwest::Client, config: &FetchConfig, target: &str) -> Response {
    match fetch_page(client, config, target).await {
        Ok(content) => {
            tracing::debug!(url = %target, chars = content.chars().count(), "Fetched page");
            response::json_content(permissive_headers(), content)
        }
        Err(e) => {
            tracing::warn!(url = %target, error = %e, "Fetch-proxy failed");
            response::json_error(e.status_code(), permissive_headers(), e.to_string())
        }
    }
}
