//! Origin forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Rewrite / PassThrough decision
//!     → client.rs (build origin URI, forward, retry)
//!     → static content origin
//!     → origin response streamed back through http/response.rs
//! ```

pub mod client;

pub use client::{OriginClient, OriginError, OriginRequest};
