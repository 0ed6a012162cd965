//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once at startup to build the mount router
//! ```
//!
//! # Design Decisions
//! - Config is read once; mounts cannot change while running
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, GatewayConfig, ListenerConfig, LogFormat, MountConfig, ObservabilityConfig,
    RoutingConfig, TimeoutConfig, UpstreamConfig,
};
