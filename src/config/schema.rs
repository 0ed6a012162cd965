//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::load_balancer::Balance;
use crate::routing::OverlapPolicy;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Prefix registration rules.
    pub routing: RoutingConfig,

    /// Handler groups and the prefixes they are mounted at.
    pub mounts: Vec<MountConfig>,

    /// Passive upstream health tracking.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routing: RoutingConfig::default(),
            mounts: default_mounts(),
            upstream: UpstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// The six handler groups of the scanner API, all served by one upstream.
fn default_mounts() -> Vec<MountConfig> {
    [
        ("asset", "/asset"),
        ("subdomain", "/subdomain"),
        ("url", "/url"),
        ("crawler", "/crawler"),
        ("common", "/data"),
        ("sensitive", "/sensitive"),
    ]
    .into_iter()
    .map(|(name, prefix)| MountConfig::new(name, prefix, "http://127.0.0.1:8000"))
    .collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// `reject` (default) or `longest_match`.
    pub overlap: OverlapPolicy,
}

/// A handler group mounted at a prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Handler group name for logging/metrics.
    pub name: String,

    /// Path prefix the group is mounted at.
    pub prefix: String,

    /// Base URLs of the services implementing this group (e.g., "http://127.0.0.1:8000").
    pub upstreams: Vec<String>,

    /// Forward only the path after the prefix.
    #[serde(default)]
    pub strip_prefix: bool,

    /// Maximum in-flight requests per upstream.
    #[serde(default = "default_max_upstream_conns")]
    pub max_connections: usize,

    /// Upstream selection strategy.
    #[serde(default)]
    pub balance: Balance,
}

impl MountConfig {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, upstream: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            upstreams: vec![upstream.into()],
            strip_prefix: false,
            max_connections: default_max_upstream_conns(),
            balance: Balance::default(),
        }
    }
}

fn default_max_upstream_conns() -> usize {
    100
}

/// Passive health settings applied to every upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Number of consecutive failures before marking unhealthy.
    pub unhealthy_threshold: u32,

    /// Number of consecutive successes before marking healthy.
    pub healthy_threshold: u32,

    /// Seconds an unhealthy upstream is skipped before it gets a trial request.
    pub cooldown_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            unhealthy_threshold: 3,
            healthy_threshold: 2,
            cooldown_secs: 10,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
