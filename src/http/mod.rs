//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, header preparation)
//!     → routing layer resolves the mount by path prefix
//!     → load balancer picks an upstream of the mount
//!     → response.rs (error mapping) or upstream response
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_FORWARDED_PREFIX, X_REQUEST_ID};
pub use response::GatewayError;
pub use server::{AppState, HttpServer};
