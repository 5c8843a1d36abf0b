//! Edge Request Normalizer Library
//!
//! Decides, for every request in front of a static content origin, whether
//! to redirect (`/docs` → `/docs/`), rewrite (`/docs/` → `/docs/index.html`)
//! or pass it through (`/app.js`).

pub mod config;
pub mod edge;
pub mod http;
pub mod lifecycle;
pub mod normalizer;
pub mod observability;
pub mod origin;
pub mod resilience;
pub mod telemetry;

pub use config::schema::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use normalizer::{normalize, Decision, Normalizer, NormalizerOptions, RequestPath};
