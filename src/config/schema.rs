//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to defaults so an empty file is a valid config.

use serde::{Deserialize, Serialize};

/// Upstream chat-completions endpoint.
pub const DEFAULT_CHAT_URL: &str = "https://api.publicai.co/v1/chat/completions";

/// Requests admitted per client per window.
pub const RATE_LIMIT: u32 = 20;

/// Length of one rate-limit window in milliseconds.
pub const WINDOW_MS: u64 = 60_000;

/// Trusted edge header carrying the connecting client IP.
pub const DEFAULT_CLIENT_IP_HEADER: &str = "cf-connecting-ip";

/// Desktop-browser User-Agent sent by the fetch-proxy.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Chat-completion upstream and its credential.
    pub upstream: UpstreamConfig,

    /// Fetch-proxy settings.
    pub fetch: FetchConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Strict CORS policy settings.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8787").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".to_string(),
        }
    }
}

/// Chat-completion upstream configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the chat-completions endpoint.
    pub chat_url: String,

    /// Bearer credential. Normally injected from the environment by the
    /// loader; never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            api_key: None,
        }
    }
}

// Keeps the credential out of logs.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("chat_url", &self.chat_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fetch-proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Deadline for the whole outbound fetch in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent presented to the source site.
    pub user_agent: String,

    /// Accept header presented to the source site.
    pub accept: String,

    /// Maximum characters of extracted text returned.
    pub max_chars: usize,

    /// Bytes of the source page read before extraction; the rest is ignored.
    pub max_page_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml".to_string(),
            max_chars: crate::extract::MAX_CHARS,
            max_page_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per client per window.
    pub max_requests: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// Trusted header carrying the connecting client IP.
    pub client_ip_header: String,

    /// How often expired windows are swept, in seconds.
    pub sweep_interval_secs: u64,

    /// How long past its expiry a window is kept before being swept.
    pub sweep_grace_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: RATE_LIMIT,
            window_ms: WINDOW_MS,
            client_ip_header: DEFAULT_CLIENT_IP_HEADER.to_string(),
            sweep_interval_secs: 60,
            sweep_grace_ms: WINDOW_MS,
        }
    }
}

/// Strict CORS policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins echoed back by the strict policy (exact match).
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://en.wikipedia.org".to_string(),
                "https://www.wikipedia.org".to_string(),
            ],
        }
    }
}

/// Timeout configuration for the chat-proxy.
///
/// Unset by default: the chat upstream is given as long as it takes, and any
/// overall request deadline belongs to the hosting platform.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for the chat upstream to start answering, in seconds.
    pub chat_secs: Option<u64>,
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum chat request body size in bytes. Image inputs make these large.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
