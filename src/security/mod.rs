//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (strict or permissive header set, chosen by route)
//!     → rate_limit.rs (per-client fixed window, chat-proxy only)
//!     → Pass to proxy handler
//! ```
//!
//! # Design Decisions
//! - Client identity comes from a trusted edge header, never the socket
//! - Rate limit state is an explicit object in the app state, not a global
//! - The two CORS policies stay separate; they are not merged

pub mod cors;
pub mod rate_limit;

pub use cors::{CorsPolicy, CorsRules};
pub use rate_limit::{Admission, RateLimiter, UsageWindow};
