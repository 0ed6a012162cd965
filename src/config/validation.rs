//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Validate upstream URLs
//! - Detect conflicting mounts with the same rules the router applies
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, MountConfig};
use crate::routing::{RegisterError, RouterBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no mounts configured")]
    NoMounts,

    #[error("mount #{0} has an empty name")]
    EmptyMountName(usize),

    #[error("mount name `{0}` is used more than once")]
    DuplicateMountName(String),

    #[error("mount `{mount}`: {source}")]
    Prefix {
        mount: String,
        #[source]
        source: RegisterError,
    },

    #[error("mount `{0}` has no upstreams")]
    NoUpstreams(String),

    #[error("mount `{mount}`: invalid upstream `{url}`: {reason}")]
    InvalidUpstream {
        mount: String,
        url: String,
        reason: String,
    },

    #[error("mount `{0}`: max_connections must be greater than 0")]
    ZeroMaxConnections(String),

    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.upstream.unhealthy_threshold == 0 {
        errors.push(ValidationError::ZeroValue("upstream.unhealthy_threshold"));
    }
    if config.upstream.healthy_threshold == 0 {
        errors.push(ValidationError::ZeroValue("upstream.healthy_threshold"));
    }

    validate_mounts(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_mounts(errors: &mut Vec<ValidationError>, config: &GatewayConfig) {
    if config.mounts.is_empty() {
        errors.push(ValidationError::NoMounts);
        return;
    }

    let mut names = HashSet::new();
    let mut prefixes = RouterBuilder::with_overlap(config.routing.overlap);

    for (index, mount) in config.mounts.iter().enumerate() {
        if mount.name.is_empty() {
            errors.push(ValidationError::EmptyMountName(index));
        } else if !names.insert(mount.name.as_str()) {
            errors.push(ValidationError::DuplicateMountName(mount.name.clone()));
        }

        if let Err(source) = prefixes.register(&mount.prefix, ()) {
            errors.push(ValidationError::Prefix {
                mount: mount.name.clone(),
                source,
            });
        }

        if mount.max_connections == 0 {
            errors.push(ValidationError::ZeroMaxConnections(mount.name.clone()));
        }

        validate_upstreams(errors, mount);
    }
}

fn validate_upstreams(errors: &mut Vec<ValidationError>, mount: &MountConfig) {
    if mount.upstreams.is_empty() {
        errors.push(ValidationError::NoUpstreams(mount.name.clone()));
    }

    for raw in &mount.upstreams {
        if let Err(reason) = check_upstream_url(raw) {
            errors.push(ValidationError::InvalidUpstream {
                mount: mount.name.clone(),
                url: raw.clone(),
                reason,
            });
        }
    }
}

/// Upstreams are plain HTTP base URLs with a host and no query or fragment.
pub(crate) fn check_upstream_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    if url.scheme() != "http" {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }

    Ok(url)
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
