//! Client for the `/api-log` event endpoint.
//!
//! # Responsibilities
//! - POST `{event, page}` JSON to `<base_url>/api-log`
//! - Turn every failure into a `BestEffort::Dropped` outcome
//!
//! # Design Decisions
//! - Base URL is passed in explicitly, never read from globals
//! - Failures are logged and returned as values, never as errors

use std::time::Duration;

use serde::Serialize;
use url::Url;

/// Path of the logging endpoint, relative to the base URL.
pub const LOG_ENDPOINT: &str = "api-log";

/// One telemetry event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    pub event: String,
    pub page: String,
}

impl LogEvent {
    pub fn new(event: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            page: page.into(),
        }
    }
}

/// Outcome of a best-effort delivery. Callers may inspect it or ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort {
    Delivered,
    Dropped(String),
}

impl BestEffort {
    pub fn is_delivered(&self) -> bool {
        matches!(self, BestEffort::Delivered)
    }
}

/// Sends events to the logging API.
#[derive(Debug, Clone)]
pub struct LogClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl LogClient {
    /// Build a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(LOG_ENDPOINT)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Deliver `event` once. Never fails; the outcome says what happened.
    pub async fn log_event(&self, event: &LogEvent) -> BestEffort {
        let result = self.http.post(self.endpoint.clone()).json(event).send().await;

        let outcome = match result {
            Ok(response) if response.status().is_success() => BestEffort::Delivered,
            Ok(response) => BestEffort::Dropped(format!("status {}", response.status())),
            Err(e) => BestEffort::Dropped(e.to_string()),
        };

        if let BestEffort::Dropped(reason) = &outcome {
            tracing::warn!(event = %event.event, reason = %reason, "Telemetry event dropped");
        }

        outcome
    }
}
