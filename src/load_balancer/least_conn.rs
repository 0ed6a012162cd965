//! Least Connections load balancing strategy.

use std::sync::Arc;

use crate::load_balancer::{backend::Upstream, LoadBalancer};

/// Least connections selector.
/// Selects the healthy upstream with the minimum number of in-flight requests.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, upstreams: &[Arc<Upstream>]) -> Option<Arc<Upstream>> {
        // In case of tie, the first one is selected (stability)
        upstreams
            .iter()
            .filter(|u| u.is_healthy())
            .min_by_key(|u| u.active_connections())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_least_conn() {
        let lb = LeastConnections::new();
        let u1 = Arc::new(Upstream::new(Url::parse("http://127.0.0.1:8080").unwrap(), 100));
        let u2 = Arc::new(Upstream::new(Url::parse("http://127.0.0.1:8081").unwrap(), 100));

        let _busy = u1.try_acquire().unwrap();
        let upstreams = vec![u1.clone(), u2.clone()];

        // u2 has 0 in flight
        assert!(Arc::ptr_eq(&lb.next_server(&upstreams).unwrap(), &u2));

        let _g1 = u2.try_acquire().unwrap();
        let _g2 = u2.try_acquire().unwrap();

        // now u2 has 2, u1 has 1
        assert!(Arc::ptr_eq(&lb.next_server(&upstreams).unwrap(), &u1));

        u1.mark_failure(1);
        assert!(Arc::ptr_eq(&lb.next_server(&upstreams).unwrap(), &u2));
    }
}
