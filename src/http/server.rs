//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Render middleware failures (timeouts) as gateway errors
//! - Bind server to listener
//! - Resolve each request to a mount via the prefix router
//! - Forward requests to the mount's upstreams
//! - Passive upstream health tracking

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    BoxError, Router,
};
use http_body_util::BodyExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, UpstreamConfig};
use crate::http::request::{
    forward_headers, request_id, strip_hop_by_hop, UuidRequestId, X_FORWARDED_PREFIX, X_REQUEST_ID,
};
use crate::http::response::GatewayError;
use crate::lifecycle::startup::{build_mount_router, StartupError};
use crate::mount::{MountGroup, MountRouter};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mounts: Arc<MountRouter>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: UpstreamConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    app: Router,
    config: GatewayConfig,
    mounts: Arc<MountRouter>,
}

impl HttpServer {
    /// Build the mount router from configuration and create the server.
    ///
    /// Fails if any mount cannot be registered.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let mounts = Arc::new(build_mount_router(&config)?);
        Ok(Self::with_mounts(config, mounts))
    }

    /// Create the server around an already sealed mount router.
    pub fn with_mounts(config: GatewayConfig, mounts: Arc<MountRouter>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            mounts: mounts.clone(),
            client,
            upstream: config.upstream.clone(),
        };

        let app = Self::build_app(&config, state);
        Self {
            app,
            config,
            mounts,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_app(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The Axum application, for serving or for in-process requests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    pub fn mounts(&self) -> &Arc<MountRouter> {
        &self.mounts
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mounts = self.mounts.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn handle_middleware_error(err: BoxError) -> GatewayError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        GatewayError::Timeout
    } else {
        GatewayError::Middleware(err)
    }
}

/// Resolves the mount for the request path and forwards to it.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id(request.headers()).to_string();

    let (group, prefix, path_and_query) = match state.mounts.resolve(request.uri().path()) {
        Ok(m) => {
            let group = m.handlers().clone();
            let path_and_query = group.forward_path(m.remainder(), request.uri());
            (group, m.prefix(), path_and_query)
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, path = %e.path, "No route matched");
            metrics::record_unmatched();
            metrics::record_request(method.as_str(), StatusCode::NOT_FOUND.as_u16(), "none", start_time);
            return GatewayError::from(e).into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        mount = group.name(),
        prefix = prefix,
        upstream_path = %path_and_query,
        "Dispatching request"
    );

    let response = match forward(&state, &group, prefix, &path_and_query, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(request_id = %request_id, mount = group.name(), error = %e, "Dispatch failed");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), group.name(), start_time);
    response
}

async fn forward(
    state: &AppState,
    group: &MountGroup,
    prefix: &str,
    path_and_query: &str,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let upstream = group.select()?;
    let uri = upstream.target_uri(path_and_query)?;

    let (parts, body) = request.into_parts();
    let mut headers = forward_headers(&parts.headers);
    if group.strip_prefix() {
        if let Ok(value) = HeaderValue::from_str(prefix) {
            headers.insert(X_FORWARDED_PREFIX, value);
        }
    }

    let mut upstream_request = Request::new(body);
    *upstream_request.method_mut() = parts.method;
    *upstream_request.uri_mut() = uri;
    *upstream_request.headers_mut() = headers;

    let healthy_threshold = state.upstream.healthy_threshold as usize;
    let unhealthy_threshold = state.upstream.unhealthy_threshold as usize;

    match state.client.request(upstream_request).await {
        Ok(response) => {
            match response.status() {
                StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                    upstream.mark_failure(unhealthy_threshold);
                }
                _ => upstream.mark_success(healthy_threshold),
            }

            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);

            // The in-flight slot is released once the body is streamed or dropped
            let body = body.map_frame(move |frame| {
                let _slot = &upstream;
                frame
            });
            Ok(Response::from_parts(parts, Body::new(body)))
        }
        Err(e) => {
            tracing::error!(
                upstream = %upstream.base_url(),
                mount = group.name(),
                error = %e,
                "Upstream error"
            );
            upstream.mark_failure(unhealthy_threshold);
            Err(GatewayError::Upstream(e))
        }
    }
}
