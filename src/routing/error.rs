//! Routing errors.

use thiserror::Error;

/// Failure to register a binding while the router is being built.
///
/// Every variant is a misconfiguration; startup treats them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("prefix must not be empty")]
    EmptyPrefix,

    #[error("prefix `{0}` must start with '/'")]
    InvalidPrefix(String),

    #[error("prefix `{0}` is already registered")]
    DuplicatePrefix(String),

    #[error("prefix `{prefix}` overlaps registered prefix `{existing}`")]
    OverlappingPrefix { prefix: String, existing: String },
}

/// No registered prefix matches the request path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches path `{path}`")]
pub struct NoRouteError {
    pub path: String,
}
