//! Prefix-routed HTTP gateway.
//!
//! Mounts handler groups at fixed path prefixes and dispatches each request
//! to the group with the longest matching prefix.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod mount;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Router, RouterBuilder};
