//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Prefix resolved → mount group identified
//!     → Apply the group's balancing algorithm:
//!         - round_robin.rs (rotate through healthy upstreams)
//!         - least_conn.rs (pick the healthy upstream with fewest in-flight requests)
//!     → backend.rs (acquire an in-flight slot)
//!     → Return upstream guard or error
//! ```
//!
//! # Design Decisions
//! - Balancer holds only its own cursor; upstreams track their own load
//! - Algorithm selection per mount
//! - Unhealthy upstreams excluded from selection until their cooldown elapses

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod least_conn;
pub mod round_robin;

use backend::Upstream;

/// Strategy for picking one upstream out of a mount's pool.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Returns a healthy upstream, or `None` if every upstream is unhealthy.
    fn next_server(&self, upstreams: &[Arc<Upstream>]) -> Option<Arc<Upstream>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
    #[default]
    RoundRobin,
    LeastConnections,
}

impl Balance {
    pub fn build(self) -> Box<dyn LoadBalancer> {
        match self {
            Balance::RoundRobin => Box::new(round_robin::RoundRobin::new()),
            Balance::LeastConnections => Box::new(least_conn::LeastConnections::new()),
        }
    }
}
