//! Path scheme parsing
//!
//! A path may carry a scheme prefix (`"memFS:/a/b"`, `"file:/tmp/x"`). The
//! scheme is the token before the first `:`; everything after it is opaque
//! to the router and interpreted by the backend that claims the scheme.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between a scheme token and the rest of the path
pub const SCHEME_SEPARATOR: char = ':';

/// Whether `token` is usable as a scheme.
///
/// Single characters are rejected so that Windows drive letters (`C:\x`)
/// never parse as schemes.
pub fn is_valid_scheme(token: &str) -> bool {
    token.len() >= 2
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Extract the scheme token of `path`, if it has one.
pub fn scheme_of(path: &str) -> Option<&str> {
    let (token, _) = path.split_once(SCHEME_SEPARATOR)?;
    is_valid_scheme(token).then_some(token)
}

/// Whether `path` begins with `scheme` followed by the separator.
pub fn has_scheme(path: &str, scheme: &str) -> bool {
    strip_scheme(path, scheme).is_some()
}

/// Remove `scheme:` from the front of `path`.
pub fn strip_scheme<'a>(path: &'a str, scheme: &str) -> Option<&'a str> {
    path.strip_prefix(scheme)?.strip_prefix(SCHEME_SEPARATOR)
}

/// Normalized, segment-based view of a path under a scheme
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualPath {
    /// Scheme token, `None` for plain paths
    pub scheme: Option<String>,
    /// Path segments
    pub segments: Vec<String>,
}

impl VirtualPath {
    pub fn new(scheme: impl Into<String>, path: impl AsRef<str>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            segments: split_segments(path.as_ref()),
        }
    }

    /// Parse a raw path string, splitting off its scheme when present.
    pub fn parse(path: &str) -> Self {
        match scheme_of(path) {
            Some(scheme) => {
                let rest = &path[scheme.len() + SCHEME_SEPARATOR.len_utf8()..];
                Self::new(scheme, rest)
            }
            None => Self {
                scheme: None,
                segments: split_segments(path),
            },
        }
    }

    pub fn root(scheme: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            segments: Vec::new(),
        }
    }

    pub fn join(&self, name: impl AsRef<str>) -> Self {
        let mut segments = self.segments.clone();
        for part in name.as_ref().split('/').filter(|s| !s.is_empty()) {
            if part == ".." {
                segments.pop();
            } else if part != "." {
                segments.push(part.to_string());
            }
        }
        Self {
            scheme: self.scheme.clone(),
            segments,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            let mut segments = self.segments.clone();
            segments.pop();
            Some(Self {
                scheme: self.scheme.clone(),
                segments,
            })
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &VirtualPath) -> bool {
        self.scheme == other.scheme && self.segments.starts_with(&other.segments)
    }

    /// Key used by backends that store entries in a flat map.
    pub fn key(&self) -> String {
        self.segments.join("/")
    }

    pub fn to_path_string(&self) -> String {
        if self.segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }

    /// Fully qualified form, scheme included.
    pub fn to_uri(&self) -> String {
        match &self.scheme {
            Some(scheme) => format!("{}{}{}", scheme, SCHEME_SEPARATOR, self.to_path_string()),
            None => self.to_path_string(),
        }
    }
}

fn split_segments(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .map(String::from)
        .collect()
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}
