//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Collect (prefix, handlers) bindings while building
//! - Reject duplicate and, by default, overlapping prefixes
//! - Look up the binding for a request path
//! - Return matched binding or explicit no-match
//!
//! # Design Decisions
//! - Building and sealed states are distinct types; only a sealed
//!   `Router` can resolve, only a `RouterBuilder` can register
//! - Immutable after sealing (thread-safe without locks)
//! - O(n) prefix scan (acceptable for typical mount counts)
//! - Explicit `NoRouteError` rather than silent default

use serde::{Deserialize, Serialize};

use crate::routing::error::{NoRouteError, RegisterError};
use crate::routing::prefix::Prefix;

/// How registration treats prefixes that would capture each other's paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// `/api` and `/api/v1` cannot both be registered.
    #[default]
    Reject,
    /// Nested prefixes are allowed; the longest match wins.
    LongestMatch,
}

/// A prefix bound to its handler group.
#[derive(Debug, Clone)]
pub struct Binding<H> {
    prefix: Prefix,
    handlers: H,
}

impl<H> Binding<H> {
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }
}

/// A router in the building state.
#[derive(Debug)]
pub struct RouterBuilder<H> {
    bindings: Vec<Binding<H>>,
    overlap: OverlapPolicy,
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouterBuilder<H> {
    pub fn new() -> Self {
        Self::with_overlap(OverlapPolicy::default())
    }

    pub fn with_overlap(overlap: OverlapPolicy) -> Self {
        Self {
            bindings: Vec::new(),
            overlap,
        }
    }

    /// Register `handlers` under `prefix`.
    ///
    /// The prefix is normalized before any check. On error nothing is
    /// appended and earlier bindings are untouched.
    pub fn register(&mut self, prefix: &str, handlers: H) -> Result<&mut Self, RegisterError> {
        let prefix = Prefix::parse(prefix)?;

        if self.bindings.iter().any(|b| b.prefix == prefix) {
            return Err(RegisterError::DuplicatePrefix(prefix.to_string()));
        }

        if self.overlap == OverlapPolicy::Reject {
            if let Some(existing) = self.bindings.iter().find(|b| b.prefix.overlaps(&prefix)) {
                return Err(RegisterError::OverlappingPrefix {
                    prefix: prefix.to_string(),
                    existing: existing.prefix.to_string(),
                });
            }
        }

        tracing::debug!(
            prefix = %prefix,
            position = self.bindings.len(),
            "Prefix registered"
        );

        self.bindings.push(Binding { prefix, handlers });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Freeze the registered bindings into an immutable router.
    pub fn seal(self) -> Router<H> {
        tracing::debug!(bindings = self.bindings.len(), "Router sealed");
        Router {
            bindings: self.bindings.into_boxed_slice(),
        }
    }
}

impl<H> From<RouterBuilder<H>> for Router<H> {
    fn from(builder: RouterBuilder<H>) -> Self {
        builder.seal()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct Match<'r, 'p, H> {
    binding: &'r Binding<H>,
    remainder: &'p str,
}

impl<'r, 'p, H> Match<'r, 'p, H> {
    pub fn prefix(&self) -> &'r str {
        self.binding.prefix()
    }

    pub fn handlers(&self) -> &'r H {
        self.binding.handlers()
    }

    /// Path left after the prefix: `""` for an exact hit, otherwise starts with `/`.
    pub fn remainder(&self) -> &'p str {
        self.remainder
    }
}

/// A sealed, immutable prefix router.
#[derive(Debug, Clone)]
pub struct Router<H> {
    bindings: Box<[Binding<H>]>,
}

impl<H> Router<H> {
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    /// Find the binding with the longest prefix that matches `path` on a
    /// segment boundary. Among equally long candidates the earliest
    /// registered one is kept.
    pub fn resolve<'r, 'p>(&'r self, path: &'p str) -> Result<Match<'r, 'p, H>, NoRouteError> {
        let mut best: Option<Match<'r, 'p, H>> = None;

        for binding in self.bindings.iter() {
            let Some(remainder) = binding.prefix.strip(path) else {
                continue;
            };

            // Strictly longer only, so the first registered wins a tie.
            let longer = best
                .as_ref()
                .map_or(true, |b| binding.prefix().len() > b.prefix().len());
            if longer {
                best = Some(Match { binding, remainder });
            }
        }

        best.ok_or_else(|| NoRouteError {
            path: path.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding<H>> {
        self.bindings.iter()
    }
}
