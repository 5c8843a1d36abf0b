//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, forwarding headers)
//!     → normalizer decides: redirect | rewrite | pass through
//!     → origin client forwards rewritten or untouched requests
//!     → response.rs (redirect, strip hop-by-hop headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
