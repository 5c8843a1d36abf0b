//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use url::Url;

use crate::config::schema::EdgeConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address is not a socket address: {0:?}")]
    BindAddress(String),
    #[error("origin.address is not a valid authority: {0:?}")]
    OriginAddress(String),
    #[error("normalizer.index_document must not be empty")]
    EmptyIndexDocument,
    #[error("normalizer.index_document must not contain '/': {0:?}")]
    IndexDocumentSlash(String),
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
    #[error("retries.max_attempts must be at least 1")]
    MaxAttempts,
    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },
    #[error("retries.budget_ratio must be within [0, 1], got {0}")]
    BudgetRatio(f32),
    #[error("observability.log_level is not a tracing level: {0:?}")]
    LogLevel(String),
    #[error("observability.metrics_address is not a socket address: {0:?}")]
    MetricsAddress(String),
    #[error("telemetry.base_url is not an http(s) URL: {0:?}")]
    TelemetryUrl(String),
    #[error("telemetry.queue_depth must be greater than zero")]
    QueueDepth,
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.origin.address.parse::<Authority>().is_err() {
        errors.push(ValidationError::OriginAddress(config.origin.address.clone()));
    }

    let index = &config.normalizer.index_document;
    if index.is_empty() {
        errors.push(ValidationError::EmptyIndexDocument);
    } else if index.contains('/') {
        errors.push(ValidationError::IndexDocumentSlash(index.clone()));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let retries = &config.retries;
    if retries.max_attempts == 0 {
        errors.push(ValidationError::MaxAttempts);
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: retries.base_delay_ms,
            max: retries.max_delay_ms,
        });
    }
    if !(0.0..=1.0).contains(&retries.budget_ratio) {
        errors.push(ValidationError::BudgetRatio(retries.budget_ratio));
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    let telemetry = &config.telemetry;
    if telemetry.enabled {
        let valid_url = Url::parse(&telemetry.base_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid_url {
            errors.push(ValidationError::TelemetryUrl(telemetry.base_url.clone()));
        }
        if telemetry.queue_depth == 0 {
            errors.push(ValidationError::QueueDepth);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
