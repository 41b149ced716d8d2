//! Read-only view of request cookies.

use std::collections::HashMap;

use axum::http::{header::COOKIE, HeaderMap};

/// Cookies sent with a request, keyed by name.
///
/// Built from every `Cookie` header. Malformed pairs and non-UTF-8 headers
/// are skipped; when a name repeats, the first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut jar = Self::default();
        for value in headers.get_all(COOKIE) {
            if let Ok(raw) = value.to_str() {
                jar.extend_from(raw);
            }
        }
        jar
    }

    /// Parse a single `Cookie` header value.
    pub fn parse(raw: &str) -> Self {
        let mut jar = Self::default();
        jar.extend_from(raw);
        jar
    }

    fn extend_from(&mut self, raw: &str) {
        for pair in raw.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.cookies
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for CookieJar
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut jar = Self::default();
        for (name, value) in iter {
            jar.cookies.entry(name.into()).or_insert_with(|| value.into());
        }
        jar
    }
}
