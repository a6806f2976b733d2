//! Edge relay for a chat-completion API.
//!
//! Proxies chat-completion requests upstream with a server-held credential,
//! serves a best-effort webpage text-extraction fetch-proxy, and applies
//! CORS and a per-client fixed-window rate limit.

pub mod config;
pub mod extract;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
