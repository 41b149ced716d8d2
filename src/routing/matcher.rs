//! Path matching logic.
//!
//! # Responsibilities
//! - Match exact paths
//! - Match path prefixes on segment boundaries
//! - Match file extensions of the last path segment
//!
//! # Design Decisions
//! - Path matching is case-sensitive, extension matching is not
//! - `/api` covers `/api` and `/api/x` but not `/apiary`
//! - No regex to guarantee O(n) matching

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;

    /// Short human-readable form, used when listing rules.
    fn describe(&self) -> String;
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    path: String,
}

impl ExactMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }

    fn describe(&self) -> String {
        format!("exact {}", self.path)
    }
}

/// Matches a path prefix on a segment boundary.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: String,
}

impl PrefixMatcher {
    /// Create a new prefix matcher.
    /// A trailing slash is dropped so `/api/` and `/api` behave the same.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }
}

impl Matcher for PrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn describe(&self) -> String {
        format!("prefix {}", self.prefix)
    }
}

/// Matches when the last path segment ends in one of the extensions.
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
}

impl ExtensionMatcher {
    /// Extensions are normalized to lowercase without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }
}

impl Matcher for ExtensionMatcher {
    fn matches(&self, path: &str) -> bool {
        let segment = path.rsplit('/').next().unwrap_or_default();
        match segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }

    fn describe(&self) -> String {
        format!("extension {}", self.extensions.join(","))
    }
}

/// Matches every path.
#[derive(Debug, Clone, Default)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _path: &str) -> bool {
        true
    }

    fn describe(&self) -> String {
        "any".to_string()
    }
}
