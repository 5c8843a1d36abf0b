//! Retry logic.
//!
//! # Responsibilities
//! - Determine if request is retryable (idempotent methods only)
//! - Enforce retry budget (retries as a share of requests)
//!
//! # Design Decisions
//! - Never retry POST/PUT/DELETE/PATCH
//! - Retry budget prevents retry storms under load
//! - Connection errors always retryable; only gateway-class 5xx are

use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{Method, StatusCode};

/// Methods whose requests may be sent to the origin more than once.
pub fn is_retry_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Whether an attempt that ended with `status` (or a connection error) may be retried.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, connection_error: bool) -> bool {
    if !is_retry_safe(method) {
        return false;
    }

    if connection_error {
        return true;
    }

    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}

/// Caps retries to a share of observed requests.
#[derive(Debug)]
pub struct RetryBudget {
    ratio: f32,
    min_retries: u64,
    requests: AtomicU64,
    retries: AtomicU64,
}

impl RetryBudget {
    /// `min_retries` are always allowed, regardless of traffic.
    pub fn new(ratio: f32, min_retries: u64) -> Self {
        Self {
            ratio,
            min_retries,
            requests: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Consume one retry from the budget if any is left.
    pub fn can_retry(&self) -> bool {
        let requests = self.requests.load(Ordering::Relaxed);
        let allowed = ((requests as f64) * f64::from(self.ratio)) as u64;
        let allowed = allowed.max(self.min_retries);

        self.retries
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |spent| {
                (spent < allowed).then_some(spent + 1)
            })
            .is_ok()
    }

    pub fn retries_spent(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
