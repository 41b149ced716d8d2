//! Request path canonicalization.
//!
//! Rules match on the canonical form of a path, and the edge server forwards
//! that same form, so the gate and the origin never disagree about which
//! page a request targets.
//!
//! Canonical form:
//! - percent-encoded unreserved characters (`A-Z a-z 0-9 - . _ ~`) decoded
//! - empty and `.` segments dropped, `..` segments resolved
//! - leading `/` always present, trailing `/` kept

use std::borrow::Cow;

/// Canonical form of `raw`, borrowed when it is already canonical.
pub fn normalize_path(raw: &str) -> Cow<'_, str> {
    if is_canonical(raw) {
        return Cow::Borrowed(raw);
    }

    let decoded = decode_unreserved(raw);
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = String::with_capacity(decoded.len());
    for segment in &segments {
        path.push('/');
        path.push_str(segment);
    }
    if segments.is_empty() || ends_with_separator(&decoded) {
        path.push('/');
    }
    Cow::Owned(path)
}

fn is_canonical(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains('%')
        && !path.contains("//")
        && path.split('/').all(|segment| segment != "." && segment != "..")
}

fn ends_with_separator(path: &str) -> bool {
    path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..")
}

fn decode_unreserved(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(byte) = hex_pair(bytes[i + 1], bytes[i + 2]).filter(|b| is_unreserved(*b)) {
                out.push(char::from(byte));
                i += 3;
                continue;
            }
        }
        let ch = raw[i..].chars().next().unwrap_or_default();
        out.push(ch);
        i += ch.len_utf8().max(1);
    }
    out
}

fn hex_pair(high: u8, low: u8) -> Option<u8> {
    let high = char::from(high).to_digit(16)?;
    let low = char::from(low).to_digit(16)?;
    u8::try_from(high * 16 + low).ok()
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_paths_are_borrowed() {
        for path in ["/", "/protected", "/protected/agents/", "/sign-in"] {
            assert!(matches!(normalize_path(path), Cow::Borrowed(p) if p == path));
        }
    }

    #[test]
    fn test_encoded_unreserved_characters_are_decoded() {
        assert_eq!(normalize_path("/%70rotected/secret"), "/protected/secret");
        assert_eq!(normalize_path("/%50%52%4f"), "/PRO");
        assert_eq!(normalize_path("/a%7Eb"), "/a~b");
    }

    #[test]
    fn test_reserved_and_malformed_escapes_are_kept() {
        assert_eq!(normalize_path("/protected%2Fsecret"), "/protected%2Fsecret");
        assert_eq!(normalize_path("/a%20b"), "/a%20b");
        assert_eq!(normalize_path("/bad%zz"), "/bad%zz");
        assert_eq!(normalize_path("/trailing%7"), "/trailing%7");
    }

    #[test]
    fn test_separators_are_collapsed() {
        assert_eq!(normalize_path("//protected/secret"), "/protected/secret");
        assert_eq!(normalize_path("/protected///agents//"), "/protected/agents/");
        assert_eq!(normalize_path("//"), "/");
    }

    #[test]
    fn test_dot_segments_are_resolved() {
        assert_eq!(normalize_path("/public/../protected/x"), "/protected/x");
        assert_eq!(normalize_path("/./protected"), "/protected");
        assert_eq!(normalize_path("/%2e%2e/protected"), "/protected");
        assert_eq!(normalize_path("/protected/.."), "/");
        assert_eq!(normalize_path("/../../etc"), "/etc");
    }

    #[test]
    fn test_relative_input_gains_leading_separator() {
        assert_eq!(normalize_path("protected/x"), "/protected/x");
    }

    #[test]
    fn test_non_ascii_is_preserved() {
        assert_eq!(normalize_path("//agents/café"), "/agents/café");
    }
}
