//! Best-effort telemetry.
//!
//! # Data Flow
//! ```text
//! edge decision
//!     → sink.rs (bounded queue, drop when full)
//!     → client.rs (POST {event, page} to <base_url>/api-log)
//!     → BestEffort::Delivered | BestEffort::Dropped (logged, counted)
//! ```
//!
//! # Design Decisions
//! - Nothing here can fail a request
//! - Delivery outcomes are values, not errors

pub mod client;
pub mod sink;

pub use client::{BestEffort, LogClient, LogEvent};
pub use sink::TelemetrySink;

/// Event name reported for an edge decision outcome.
pub fn decision_event(outcome: &str) -> String {
    format!("edge_{}", outcome)
}
