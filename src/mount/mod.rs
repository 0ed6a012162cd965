//! Mounted handler groups.
//!
//! A mount is the handler group the prefix router hands back: a named pool
//! of upstream services that implement every route under one prefix.
//!
//! # Data Flow
//! ```text
//! MountConfig[]
//!     → MountGroup::from_config (parse upstream URLs, pick balancer)
//!     → RouterBuilder::register(prefix, Arc<MountGroup>)
//!     → seal() → MountRouter, shared via Arc with every request task
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::http::Uri;

use crate::config::validation::check_upstream_url;
use crate::config::{MountConfig, UpstreamConfig};
use crate::http::response::GatewayError;
use crate::lifecycle::startup::StartupError;
use crate::load_balancer::backend::{Upstream, UpstreamGuard};
use crate::load_balancer::LoadBalancer;
use crate::routing::Router;

/// The sealed router the gateway dispatches with.
pub type MountRouter = Router<Arc<MountGroup>>;

/// A handler group: a named set of upstreams mounted under one prefix.
#[derive(Debug)]
pub struct MountGroup {
    name: String,
    strip_prefix: bool,
    upstreams: Vec<Arc<Upstream>>,
    balancer: Box<dyn LoadBalancer>,
}

impl MountGroup {
    pub fn from_config(config: &MountConfig, health: &UpstreamConfig) -> Result<Self, StartupError> {
        let cooldown = Duration::from_secs(health.cooldown_secs);
        let upstreams = config
            .upstreams
            .iter()
            .map(|raw| {
                check_upstream_url(raw)
                    .map(|url| {
                        Arc::new(Upstream::new(url, config.max_connections).with_cooldown(cooldown))
                    })
                    .map_err(|reason| StartupError::Upstream {
                        mount: config.name.clone(),
                        url: raw.clone(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name.clone(),
            strip_prefix: config.strip_prefix,
            upstreams,
            balancer: config.balance.build(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strip_prefix(&self) -> bool {
        self.strip_prefix
    }

    pub fn upstreams(&self) -> &[Arc<Upstream>] {
        &self.upstreams
    }

    /// Pick a healthy upstream and take an in-flight slot on it.
    pub fn select(&self) -> Result<UpstreamGuard, GatewayError> {
        let upstream = self
            .balancer
            .next_server(&self.upstreams)
            .ok_or_else(|| GatewayError::NoHealthyUpstream(self.name.clone()))?;

        upstream
            .try_acquire()
            .ok_or_else(|| GatewayError::UpstreamSaturated(self.name.clone()))
    }

    /// Path and query to send upstream for a request whose path left
    /// `remainder` after the mount prefix.
    pub fn forward_path(&self, remainder: &str, uri: &Uri) -> String {
        let path = match (self.strip_prefix, remainder) {
            (false, _) => uri.path(),
            (true, "") => "/",
            (true, rest) => rest,
        };

        match uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(strip_prefix: bool) -> MountGroup {
        let mut config = MountConfig::new("asset", "/asset", "http://127.0.0.1:8000");
        config.strip_prefix = strip_prefix;
        MountGroup::from_config(&config, &UpstreamConfig::default()).unwrap()
    }

    #[test]
    fn test_forward_path_keeps_prefix_by_default() {
        let uri: Uri = "/asset/42?page=1".parse().unwrap();
        assert_eq!(group(false).forward_path("/42", &uri), "/asset/42?page=1");
    }

    #[test]
    fn test_forward_path_strips_prefix() {
        let g = group(true);
        let uri: Uri = "/asset/42?page=1".parse().unwrap();
        assert_eq!(g.forward_path("/42", &uri), "/42?page=1");

        let exact: Uri = "/asset".parse().unwrap();
        assert_eq!(g.forward_path("", &exact), "/");
    }

    #[test]
    fn test_select_reports_unhealthy_and_saturated() {
        let mut config = MountConfig::new("url", "/url", "http://127.0.0.1:8000");
        config.max_connections = 1;
        let g = MountGroup::from_config(&config, &UpstreamConfig::default()).unwrap();

        let held = g.select().unwrap();
        assert!(matches!(g.select(), Err(GatewayError::UpstreamSaturated(name)) if name == "url"));
        drop(held);

        g.upstreams()[0].mark_failure(1);
        assert!(matches!(g.select(), Err(GatewayError::NoHealthyUpstream(_))));
    }

    #[test]
    fn test_invalid_upstream_is_startup_error() {
        let config = MountConfig::new("crawler", "/crawler", "not a url");
        assert!(matches!(
            MountGroup::from_config(&config, &UpstreamConfig::default()),
            Err(StartupError::Upstream { mount, .. }) if mount == "crawler"
        ));
    }
}
