//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map gateway failures to HTTP status codes
//! - Render error bodies as `{"detail": ...}` JSON
//!
//! # Design Decisions
//! - Unmatched paths are a plain 404, never fatal
//! - Upstream error details are logged, not returned to the client

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::routing::NoRouteError;

/// Per-request failure while dispatching to a mount.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    NoRoute(#[from] NoRouteError),

    #[error("no healthy upstream for mount `{0}`")]
    NoHealthyUpstream(String),

    #[error("all upstreams for mount `{0}` are at capacity")]
    UpstreamSaturated(String),

    #[error("invalid upstream uri: {0}")]
    InvalidUri(#[from] InvalidUri),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("request timed out")]
    Timeout,

    #[error("middleware failure: {0}")]
    Middleware(axum::BoxError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NoRoute(_) => StatusCode::NOT_FOUND,
            GatewayError::NoHealthyUpstream(_) | GatewayError::UpstreamSaturated(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::InvalidUri(_) | GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Middleware(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = status.canonical_reason().unwrap_or("Error");
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
