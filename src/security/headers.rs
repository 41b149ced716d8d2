//! Security response headers.
//!
//! # Responsibilities
//! - Hold the ordered header set applied to every gated response
//! - Build it once from configuration
//! - Merge it into response header maps
//!
//! # Design Decisions
//! - Constructed at startup, shared read-only via `Arc`
//! - Applying overwrites any value the upstream already set

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::SecurityConfig;

/// The five hardening headers, in emission order.
pub const STANDARD_HEADERS: [(&str, &str); 5] = [
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("x-xss-protection", "1; mode=block"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderSetError {
    #[error("invalid header name {0:?}")]
    Name(String),
    #[error("invalid value for header {0}")]
    Value(String),
}

/// Immutable, ordered set of headers added to outgoing responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// The standard set.
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_HEADERS
                .iter()
                .map(|&(name, value)| {
                    (HeaderName::from_static(name), HeaderValue::from_static(value))
                })
                .collect(),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, HeaderSetError> {
        let entries = config
            .headers
            .iter()
            .map(|header| {
                let name = HeaderName::from_bytes(header.name.as_bytes())
                    .map_err(|_| HeaderSetError::Name(header.name.clone()))?;
                let value = HeaderValue::from_str(&header.value)
                    .map_err(|_| HeaderSetError::Value(header.name.clone()))?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Insert every header, replacing existing values of the same name.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::standard()
    }
}
