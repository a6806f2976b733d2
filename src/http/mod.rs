//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, shared state)
//!     → request.rs (request ID, client id, fetch target)
//!     → dispatcher.rs (pick preflight / fetch / 405 / 429 / chat)
//!     → fetch_proxy.rs | chat_proxy.rs (outbound call)
//!     → response.rs (CORS headers, JSON or streamed body)
//!     → Send to client
//! ```

pub mod chat_proxy;
pub mod dispatcher;
pub mod fetch_proxy;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{dispatch, relay_handler, Route};
pub use request::{MakeRelayRequestId, X_REQUEST_ID};
pub use server::{AppState, RelayServer};
