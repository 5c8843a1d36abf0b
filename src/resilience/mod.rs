//! Resilience subsystem for origin requests.
//!
//! # Data Flow
//! ```text
//! Forward attempt fails (connection error or 502/503/504)
//!     → retries.rs (idempotent? budget left?)
//!     → backoff.rs (exponential delay with jitter)
//!     → next attempt
//! ```
//!
//! # Design Decisions
//! - Retry only idempotent requests
//! - Budget is shared by all requests of one server

pub mod backoff;
pub mod retries;
