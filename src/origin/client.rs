//! Forwarding to the static content origin.
//!
//! # Responsibilities
//! - Build the origin URI from the configured authority and the target
//! - Send the request with a connect timeout
//! - Retry idempotent requests on connection errors and gateway statuses
//!
//! # Design Decisions
//! - Bodies of retry-safe requests are buffered so they can be replayed
//! - Everything else streams straight through in a single attempt

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, Response, Uri},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{OriginConfig, RetryConfig, TimeoutConfig};
use crate::observability::metrics;
use crate::resilience::backoff::retry_delay;
use crate::resilience::retries::{is_retry_safe, is_retryable, RetryBudget};

/// Minimum number of retries the budget always allows.
const MIN_RETRIES: u64 = 100;

/// Errors from forwarding a request to the origin.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("invalid origin URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),
    #[error("failed to build origin request: {0}")]
    Build(#[from] axum::http::Error),
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
    #[error("origin request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// A request ready to be sent to the origin.
#[derive(Debug)]
pub struct OriginRequest {
    pub method: Method,
    /// Path and query to request from the origin.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Body,
}

/// HTTP client for the origin, shared by all requests.
pub struct OriginClient {
    client: Client<HttpConnector, Body>,
    retry: RetryConfig,
    budget: RetryBudget,
    max_body_bytes: usize,
}

impl OriginClient {
    pub fn new(timeouts: &TimeoutConfig, retry: RetryConfig, max_body_bytes: usize) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let budget = RetryBudget::new(retry.budget_ratio, MIN_RETRIES);

        Self {
            client,
            retry,
            budget,
            max_body_bytes,
        }
    }

    /// Absolute URI for `target` on `origin`.
    pub fn origin_uri(origin: &OriginConfig, target: &str) -> Result<Uri, OriginError> {
        Ok(format!("http://{}{}", origin.address, target).parse::<Uri>()?)
    }

    /// Send `request` to `origin`, retrying when allowed.
    pub async fn forward(
        &self,
        origin: &OriginConfig,
        request: OriginRequest,
        request_id: &str,
    ) -> Result<Response<Incoming>, OriginError> {
        let uri = Self::origin_uri(origin, &request.target)?;
        self.budget.record_request();

        let OriginRequest { method, headers, body, .. } = request;

        let max_attempts = if self.retry.enabled && is_retry_safe(&method) {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        if max_attempts == 1 {
            let req = build_request(&method, &uri, &headers, body)?;
            return Ok(self.client.request(req).await?);
        }

        let bytes = axum::body::to_bytes(body, self.max_body_bytes).await?;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let req = build_request(&method, &uri, &headers, Body::from(bytes.clone()))?;
            let attempts_left = attempt < max_attempts;

            match self.client.request(req).await {
                Ok(response) => {
                    let status = response.status();
                    if attempts_left
                        && is_retryable(&method, Some(status), false)
                        && self.budget.can_retry()
                    {
                        let delay = retry_delay(attempt, &self.retry);
                        tracing::info!(request_id = %request_id, attempt, delay = ?delay, status = %status, "Retrying origin request");
                        metrics::record_origin_retry();
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(request_id = %request_id, attempt, error = %e, "Origin request error");
                    if attempts_left && is_retryable(&method, None, true) && self.budget.can_retry() {
                        let delay = retry_delay(attempt, &self.retry);
                        tracing::info!(request_id = %request_id, attempt, delay = ?delay, "Retrying after connection error");
                        metrics::record_origin_retry();
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

fn build_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: Body) -> Result<Request<Body>, OriginError> {
    let mut req = Request::builder().method(method.clone()).uri(uri.clone());
    if let Some(target) = req.headers_mut() {
        target.extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    Ok(req.body(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_uri() {
        let origin = OriginConfig {
            address: "127.0.0.1:3000".into(),
            host_header: None,
        };
        let uri = OriginClient::origin_uri(&origin, "/docs/index.html?page=2").unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:3000/docs/index.html?page=2");
        assert_eq!(uri.path(), "/docs/index.html");
        assert_eq!(uri.query(), Some("page=2"));
    }

    #[test]
    fn test_build_request_keeps_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("accept-language", "en".parse().unwrap());
        headers.append("accept-language", "fr".parse().unwrap());

        let uri: Uri = "http://127.0.0.1:3000/".parse().unwrap();
        let req = build_request(&Method::GET, &uri, &headers, Body::empty()).unwrap();
        assert_eq!(req.headers().get_all("accept-language").iter().count(), 2);
        assert_eq!(req.uri(), &uri);
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_an_error() {
        let retry = RetryConfig {
            max_attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 1,
            ..Default::default()
        };
        let client = OriginClient::new(&TimeoutConfig::default(), retry, 1024);
        let origin = OriginConfig {
            address: "127.0.0.1:9".into(),
            host_header: None,
        };
        let request = OriginRequest {
            method: Method::GET,
            target: "/index.html".into(),
            headers: HeaderMap::new(),
            body: Body::empty(),
        };

        let result = client.forward(&origin, request, "test").await;
        assert!(matches!(result, Err(OriginError::Upstream(_))));
    }
}
