//! Upstream abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream service behind a mount
//! - Track in-flight requests (for Least Connections and limits)
//! - Enforce max in-flight limit
//! - Track passive health state (Healthy/Unhealthy)
//! - Readmit unhealthy upstreams on probation after a cooldown

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::uri::InvalidUri;
use axum::http::Uri;
use url::Url;

use crate::observability::metrics;

/// How long an unhealthy upstream is skipped before it gets a trial request.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Health State enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// A single upstream service.
#[derive(Debug)]
pub struct Upstream {
    /// Base URL requests are forwarded to.
    base_url: Url,
    /// Maximum concurrent in-flight requests allowed.
    max_connections: usize,
    /// Number of currently in-flight requests.
    active_connections: AtomicUsize,

    state: AtomicU8,
    consecutive_failures: AtomicUsize,
    consecutive_successes: AtomicUsize,

    cooldown: Duration,
    /// Reference point for `ejected_at_ms`.
    epoch: Instant,
    /// When the upstream last failed while unhealthy, in ms since `epoch`.
    ejected_at_ms: AtomicU64,
}

impl Upstream {
    pub fn new(base_url: Url, max_connections: usize) -> Self {
        Self {
            base_url,
            max_connections,
            active_connections: AtomicUsize::new(0),
            state: AtomicU8::new(HealthState::Unknown as u8),
            consecutive_failures: AtomicUsize::new(0),
            consecutive_successes: AtomicUsize::new(0),
            cooldown: DEFAULT_COOLDOWN,
            epoch: Instant::now(),
            ejected_at_ms: AtomicU64::new(0),
        }
    }

    /// Set how long the upstream stays out of rotation once unhealthy.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn health(&self) -> HealthState {
        self.state.load(Ordering::Relaxed).into()
    }

    /// Build the URI to send upstream. The base URL's own path, if any, is kept in front.
    pub fn target_uri(&self, path_and_query: &str) -> Result<Uri, InvalidUri> {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path_and_query}").parse()
    }

    /// Try to take an in-flight slot. Returns `None` at the limit.
    pub fn try_acquire(self: &Arc<Self>) -> Option<UpstreamGuard> {
        let mut prev = self.active_connections.load(Ordering::Relaxed);
        loop {
            if prev >= self.max_connections {
                return None;
            }
            match self.active_connections.compare_exchange_weak(
                prev,
                prev + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => prev = x,
            }
        }
        Some(UpstreamGuard {
            upstream: self.clone(),
        })
    }

    // --- Health Logic ---

    /// Return true if upstream may be selected: Healthy, Unknown, or
    /// Unhealthy with its cooldown elapsed (on probation).
    pub fn is_healthy(&self) -> bool {
        self.health() != HealthState::Unhealthy || self.cooldown_elapsed()
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn cooldown_elapsed(&self) -> bool {
        let ejected_at = self.ejected_at_ms.load(Ordering::Relaxed);
        let cooldown = u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms().saturating_sub(ejected_at) >= cooldown
    }

    /// Report a successful request.
    pub fn mark_success(&self, healthy_threshold: usize) {
        self.consecutive_failures.store(0, Ordering::Relaxed);

        if self.health() == HealthState::Healthy {
            return;
        }

        let successes = self.consecutive_successes.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= healthy_threshold {
            self.state.store(HealthState::Healthy as u8, Ordering::Relaxed);
            tracing::info!(upstream = %self.base_url, "Upstream marked healthy");
            metrics::record_upstream_health(self.base_url.as_str(), true);
        }
    }

    /// Report a failed request.
    pub fn mark_failure(&self, unhealthy_threshold: usize) {
        self.consecutive_successes.store(0, Ordering::Relaxed);

        // A failed trial restarts the cooldown
        if self.health() == HealthState::Unhealthy {
            self.ejected_at_ms.store(self.elapsed_ms(), Ordering::Relaxed);
            return;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= unhealthy_threshold {
            self.ejected_at_ms.store(self.elapsed_ms(), Ordering::Relaxed);
            self.state.store(HealthState::Unhealthy as u8, Ordering::Relaxed);
            tracing::warn!(upstream = %self.base_url, failures, "Upstream marked unhealthy");
            metrics::record_upstream_health(self.base_url.as_str(), false);
        }
    }
}

/// A RAII guard holding one in-flight slot on an upstream.
#[derive(Debug)]
pub struct UpstreamGuard {
    upstream: Arc<Upstream>,
}

impl Deref for UpstreamGuard {
    type Target = Upstream;
    fn deref(&self) -> &Self::Target {
        &self.upstream
    }
}

impl Drop for UpstreamGuard {
    fn drop(&mut self) {
        self.upstream.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
