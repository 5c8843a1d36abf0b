//! Edge invocation boundary.
//!
//! # Data Flow
//! ```text
//! EdgeRequest (JSON event from the edge runtime)
//!     → validate path (reject malformed input, never guess)
//!     → normalizer::decide
//!     → EdgeOutput::Response (301) | EdgeOutput::Request (same request, maybe rewritten)
//! ```

pub mod event;

pub use event::{handle, EdgeOutput, EdgeRequest, EdgeResponse};
