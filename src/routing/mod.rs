//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Mount registration (at startup):
//!     register(prefix, handlers)*
//!     → prefix.rs (normalize, reject empty/relative prefixes)
//!     → router.rs (duplicate and overlap checks)
//!     → seal() → immutable Router
//!
//! Incoming request path
//!     → router.rs (longest segment-boundary prefix)
//!     → Return: Match (prefix, handlers, remainder) or NoRouteError
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same binding
//! - Longest prefix wins, registration order breaks ties

pub mod error;
pub mod prefix;
pub mod router;

pub use error::{NoRouteError, RegisterError};
pub use prefix::Prefix;
pub use router::{Binding, Match, OverlapPolicy, Router, RouterBuilder};
