//! Prefix normalization and matching.
//!
//! # Responsibilities
//! - Normalize registered prefixes (leading `/`, no trailing or repeated `/`)
//! - Match request paths on segment boundaries (case-sensitive)
//! - Detect overlapping prefixes for conflict checks
//!
//! # Design Decisions
//! - `/data` matches `/data` and `/data/...`, never `/database`
//! - The root prefix `/` matches every absolute path
//! - Request paths are matched as given; only prefixes are normalized

use std::fmt;

use crate::routing::error::RegisterError;

/// A normalized mount prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix(String);

impl Prefix {
    /// Parse and normalize a raw prefix.
    ///
    /// `"/asset/"` and `"//asset"` both normalize to `"/asset"`; `"/"` stays the root.
    pub fn parse(raw: &str) -> Result<Self, RegisterError> {
        if raw.is_empty() {
            return Err(RegisterError::EmptyPrefix);
        }
        if !raw.starts_with('/') {
            return Err(RegisterError::InvalidPrefix(raw.to_string()));
        }

        let mut normalized = String::with_capacity(raw.len());
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            normalized.push('/');
            normalized.push_str(segment);
        }
        if normalized.is_empty() {
            normalized.push('/');
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns what is left of `path` after this prefix, if the prefix matches
    /// on a segment boundary. The root prefix leaves the whole path.
    pub fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.is_root() {
            return path.starts_with('/').then_some(path);
        }

        let rest = path.strip_prefix(self.0.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    /// Returns true if `path` falls under this prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Two prefixes overlap when either one would capture the other's paths.
    pub fn overlaps(&self, other: &Prefix) -> bool {
        self.matches(other.as_str()) || other.matches(self.as_str())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Prefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Prefix::parse("/asset").unwrap().as_str(), "/asset");
        assert_eq!(Prefix::parse("/asset/").unwrap().as_str(), "/asset");
        assert_eq!(Prefix::parse("//asset//v1/").unwrap().as_str(), "/asset/v1");
        assert_eq!(Prefix::parse("/").unwrap().as_str(), "/");
        assert_eq!(Prefix::parse("///").unwrap().as_str(), "/");
    }

    #[test]
    fn test_invalid_prefixes() {
        assert_eq!(Prefix::parse(""), Err(RegisterError::EmptyPrefix));
        assert_eq!(
            Prefix::parse("asset"),
            Err(RegisterError::InvalidPrefix("asset".into()))
        );
    }

    #[test]
    fn test_segment_boundary() {
        let data = Prefix::parse("/data").unwrap();

        assert_eq!(data.strip("/data"), Some(""));
        assert_eq!(data.strip("/data/"), Some("/"));
        assert_eq!(data.strip("/data/list/1"), Some("/list/1"));
        assert_eq!(data.strip("/database"), None);
        assert_eq!(data.strip("/Data"), None); // Case sensitive
        assert_eq!(data.strip("/other"), None);
    }

    #[test]
    fn test_root_prefix() {
        let root = Prefix::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root.strip("/anything/else"), Some("/anything/else"));
        assert_eq!(root.strip("/"), Some("/"));
        assert_eq!(root.strip("relative"), None);
    }

    #[test]
    fn test_overlap() {
        let api = Prefix::parse("/api").unwrap();
        let v1 = Prefix::parse("/api/v1").unwrap();
        let apis = Prefix::parse("/apis").unwrap();
        let root = Prefix::parse("/").unwrap();

        assert!(api.overlaps(&v1));
        assert!(v1.overlaps(&api));
        assert!(!api.overlaps(&apis));
        assert!(root.overlaps(&api));
    }
}
