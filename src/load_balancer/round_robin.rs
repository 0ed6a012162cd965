//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Upstream, LoadBalancer};

/// Round-robin selector.
/// Stores an internal counter to rotate through upstreams.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, upstreams: &[Arc<Upstream>]) -> Option<Arc<Upstream>> {
        if upstreams.is_empty() {
            return None;
        }

        // At most one full lap, skipping unhealthy entries
        let start = self.counter.fetch_add(1, Ordering::Relaxed);
        let len = upstreams.len();

        (0..len)
            .map(|i| &upstreams[(start + i) % len])
            .find(|u| u.is_healthy())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn upstream(port: u16) -> Arc<Upstream> {
        let url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
        Arc::new(Upstream::new(url, 100))
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let u1 = upstream(8080);
        let u2 = upstream(8081);
        let upstreams = vec![u1.clone(), u2.clone()];

        let s1 = lb.next_server(&upstreams).unwrap();
        assert!(Arc::ptr_eq(&s1, &u1));

        let s2 = lb.next_server(&upstreams).unwrap();
        assert!(Arc::ptr_eq(&s2, &u2));

        let s3 = lb.next_server(&upstreams).unwrap();
        assert!(Arc::ptr_eq(&s3, &u1));
    }

    #[test]
    fn test_skips_unhealthy() {
        let lb = RoundRobin::new();
        let u1 = upstream(8080);
        let u2 = upstream(8081);
        u1.mark_failure(1);
        let upstreams = vec![u1.clone(), u2.clone()];

        for _ in 0..4 {
            assert!(Arc::ptr_eq(&lb.next_server(&upstreams).unwrap(), &u2));
        }

        u2.mark_failure(1);
        assert!(lb.next_server(&upstreams).is_none());
        assert!(lb.next_server(&[]).is_none());
    }
}
