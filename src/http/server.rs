//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the edge handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Run the normalizer on every request
//! - Answer redirects at the edge, forward everything else to the origin
//! - Apply hot-reloaded normalizer and origin settings
//! - Observability (metrics, request IDs, telemetry)

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request, Response},
    routing::any,
    Router,
};
use arc_swap::ArcSwap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{EdgeConfig, OriginConfig};
use crate::http::request::{self, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response;
use crate::normalizer::{Decision, Normalizer, RequestPath};
use crate::observability::metrics;
use crate::origin::{OriginClient, OriginRequest};
use crate::telemetry::{self, LogClient, LogEvent, TelemetrySink};

/// Settings that can change while the server runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeState {
    pub normalizer: Normalizer,
    pub origin: OriginConfig,
}

impl RuntimeState {
    pub fn from_config(config: &EdgeConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config.normalizer.clone()),
            origin: config.origin.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ArcSwap<RuntimeState>>,
    pub origin_client: Arc<OriginClient>,
    pub telemetry: Option<TelemetrySink>,
}

/// HTTP server for the edge.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
    runtime: Arc<ArcSwap<RuntimeState>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Must be called inside a Tokio runtime when telemetry is enabled, since
    /// the telemetry worker is spawned here.
    pub fn new(config: EdgeConfig) -> Self {
        let runtime = Arc::new(ArcSwap::from_pointee(RuntimeState::from_config(&config)));

        let origin_client = Arc::new(OriginClient::new(
            &config.timeouts,
            config.retries.clone(),
            config.limits.max_body_bytes,
        ));

        let telemetry = if config.telemetry.enabled {
            match LogClient::new(&config.telemetry.base_url) {
                Ok(client) => {
                    let (sink, _worker) = TelemetrySink::spawn(client, config.telemetry.queue_depth);
                    Some(sink)
                }
                Err(e) => {
                    tracing::error!(error = %e, base_url = %config.telemetry.base_url, "Telemetry disabled, invalid base URL");
                    None
                }
            }
        } else {
            None
        };

        let state = AppState {
            runtime: runtime.clone(),
            origin_client,
            telemetry,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            runtime,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(edge_handler))
            .route("/{*path}", any(edge_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configs received on `config_updates` replace the normalizer options
    /// and origin settings of in-flight and future requests.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.address,
            "HTTP server starting"
        );

        tokio::spawn(apply_config_updates(
            self.runtime.clone(),
            self.config.clone(),
            config_updates,
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Handle to the live normalizer and origin settings.
    pub fn runtime(&self) -> Arc<ArcSwap<RuntimeState>> {
        self.runtime.clone()
    }
}

/// Swap in new runtime settings as validated configs arrive.
async fn apply_config_updates(
    runtime: Arc<ArcSwap<RuntimeState>>,
    mut current: EdgeConfig,
    mut updates: mpsc::UnboundedReceiver<EdgeConfig>,
) {
    while let Some(next) = updates.recv().await {
        if next.listener != current.listener {
            tracing::warn!(
                current = %current.listener.bind_address,
                requested = %next.listener.bind_address,
                "Listener changes require a restart, keeping current address"
            );
        }
        if next.timeouts != current.timeouts
            || next.limits != current.limits
            || next.retries != current.retries
            || next.observability != current.observability
            || next.telemetry != current.telemetry
        {
            tracing::warn!("Only [normalizer] and [origin] are hot-reloaded; other changes apply on restart");
        }

        runtime.store(Arc::new(RuntimeState::from_config(&next)));
        tracing::info!(
            origin = %next.origin.address,
            dot_scope = ?next.normalizer.dot_scope,
            index_document = %next.normalizer.index_document,
            "Configuration reloaded"
        );
        current = next;
    }
}

/// Main edge handler.
/// Normalizes the path, then redirects or forwards to the origin.
async fn edge_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request::request_id(request.headers());

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let path = match RequestPath::parse(&target) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(request_id = %request_id, target = %target, error = %e, "Rejected malformed request target");
            return finish(&method, start_time, response::bad_request("Malformed request path"));
        }
    };

    // A `//host` path would turn into a protocol-relative Location.
    if path.path().starts_with("//") {
        tracing::warn!(request_id = %request_id, target = %target, "Rejected request path starting with //");
        return finish(&method, start_time, response::bad_request("Malformed request path"));
    }

    let runtime = state.runtime.load_full();
    let decision = runtime.normalizer.decide(&path);

    metrics::record_decision(decision.outcome());
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        outcome = decision.outcome(),
        "Normalized request"
    );

    if let Some(sink) = &state.telemetry {
        sink.report(LogEvent::new(telemetry::decision_event(decision.outcome()), path.path()));
    }

    let forward_target = match decision {
        Decision::Redirect { location } => {
            return finish(&method, start_time, response::moved_permanently(&location));
        }
        Decision::Rewrite { path: rewritten } => path.target_with(&rewritten),
        Decision::PassThrough => path.to_string(),
    };

    let (parts, body) = request.into_parts();
    let origin_request = OriginRequest {
        method: method.clone(),
        target: forward_target,
        headers: request::forward_headers(&parts.headers, peer, runtime.origin.host_header.as_deref()),
        body,
    };

    match state.origin_client.forward(&runtime.origin, origin_request, &request_id).await {
        Ok(origin_response) => finish(&method, start_time, response::from_origin(origin_response)),
        Err(e) => {
            tracing::error!(request_id = %request_id, origin = %runtime.origin.address, error = %e, "Origin request failed");
            metrics::record_origin_error();
            finish(&method, start_time, response::bad_gateway())
        }
    }
}

fn finish(method: &Method, start_time: Instant, response: Response<Body>) -> Response<Body> {
    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
