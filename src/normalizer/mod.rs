//! Path normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request target ("/docs?x=1")
//!     → path.rs (validate, split path from query)
//!     → rules.rs (classify file-like / directory-like, apply rules in order)
//!     → decision.rs (Redirect | Rewrite | PassThrough)
//! ```
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no shared state, safe to call from any task
//! - Total over valid paths: every `RequestPath` yields exactly one `Decision`
//! - Malformed targets are rejected when building `RequestPath`, never guessed
//! - The dot check only ever looks at the path, never the query

pub mod decision;
pub mod path;
pub mod rules;

pub use decision::Decision;
pub use path::{PathError, RequestPath};
pub use rules::{DotScope, Normalizer, NormalizerOptions};

/// Parse `target` and decide with the default options.
pub fn normalize(target: &str) -> Result<Decision, PathError> {
    let path = RequestPath::parse(target)?;
    Ok(Normalizer::default().decide(&path))
}
