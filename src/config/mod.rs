//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, inject credential from env)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults; the defaults are the relay's fixed constants
//! - The upstream credential only ever comes from the hosting environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, FetchConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, RelayConfig,
    SecurityConfig, TimeoutConfig, UpstreamConfig,
};
