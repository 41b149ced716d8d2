//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate paths, status codes, header tokens and URLs
//! - Detect policies that would loop (sign-in under the protected prefix)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::{GateConfig, MatcherConfig, SessionModeConfig};
use crate::routing::matcher::{Matcher, PrefixMatcher};

const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if let Some(origin) = &config.upstream.origin {
        match Url::parse(origin) {
            Ok(url) if url.scheme() != "http" => errors.push(ValidationError::new(
                "upstream.origin",
                format!("scheme {:?} is not supported, use http", url.scheme()),
            )),
            Ok(url) if url.host_str().is_none() => {
                errors.push(ValidationError::new("upstream.origin", "origin has no host"))
            }
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new("upstream.origin", e.to_string())),
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    validate_gate_policy(config, &mut errors);
    validate_session(config, &mut errors);

    for (i, header) in config.security.headers.iter().enumerate() {
        if HeaderName::from_bytes(header.name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                format!("security.headers[{i}].name"),
                format!("{:?} is not a valid header name", header.name),
            ));
        }
        if HeaderValue::from_str(&header.value).is_err() {
            errors.push(ValidationError::new(
                format!("security.headers[{i}].value"),
                format!("{:?} is not a valid header value", header.value),
            ));
        }
    }

    for (i, rule) in config.rules.iter().enumerate() {
        let field = format!("rules[{i}].matcher");
        match &rule.matcher {
            MatcherConfig::Exact(path) | MatcherConfig::Prefix(path) => {
                check_path(&field, path, &mut errors)
            }
            MatcherConfig::Extension(exts) if exts.is_empty() => {
                errors.push(ValidationError::new(field, "extension list is empty"))
            }
            MatcherConfig::Extension(_) | MatcherConfig::Any => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_gate_policy(config: &GateConfig, errors: &mut Vec<ValidationError>) {
    let gate = &config.gate;

    check_path("gate.protected_prefix", &gate.protected_prefix, errors);
    check_path("gate.sign_in_path", &gate.sign_in_path, errors);
    check_path("gate.home_path", &gate.home_path, errors);
    check_location_text("gate.protected_prefix", &gate.protected_prefix, errors);
    check_location_text("gate.sign_in_path", &gate.sign_in_path, errors);
    if gate.include_return_to {
        check_location_text("gate.return_to_param", &gate.return_to_param, errors);
    }

    if gate.protected_prefix.starts_with('/')
        && PrefixMatcher::new(&gate.protected_prefix).matches(&gate.sign_in_path)
    {
        errors.push(ValidationError::new(
            "gate.sign_in_path",
            "sign-in path lies under the protected prefix and would redirect to itself",
        ));
    }

    if gate.include_return_to && gate.return_to_param.trim().is_empty() {
        errors.push(ValidationError::new(
            "gate.return_to_param",
            "must be set when include_return_to is enabled",
        ));
    }

    if !REDIRECT_STATUSES.contains(&gate.redirect_status) {
        errors.push(ValidationError::new(
            "gate.redirect_status",
            format!("{} is not a redirect status", gate.redirect_status),
        ));
    }

    for (i, prefix) in gate.bypass_prefixes.iter().enumerate() {
        check_path(&format!("gate.bypass_prefixes[{i}]"), prefix, errors);
    }
    for (i, path) in gate.bypass_exact.iter().enumerate() {
        check_path(&format!("gate.bypass_exact[{i}]"), path, errors);
    }
    for (i, ext) in gate.bypass_extensions.iter().enumerate() {
        if ext.trim_start_matches('.').is_empty() {
            errors.push(ValidationError::new(
                format!("gate.bypass_extensions[{i}]"),
                "extension is empty",
            ));
        }
    }
}

fn validate_session(config: &GateConfig, errors: &mut Vec<ValidationError>) {
    let session = &config.session;
    match session.mode {
        SessionModeConfig::CookiePresence => {
            if session.cookie_names.iter().all(|name| name.trim().is_empty()) {
                errors.push(ValidationError::new(
                    "session.cookie_names",
                    "at least one cookie name is required",
                ));
            }
        }
        SessionModeConfig::ProviderValidated => {
            match Url::parse(&session.provider_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(ValidationError::new(
                    "session.provider_url",
                    format!("scheme {:?} is not supported", url.scheme()),
                )),
                Err(e) => errors.push(ValidationError::new(
                    "session.provider_url",
                    format!("{:?}: {}", session.provider_url, e),
                )),
            }
            if session.anon_key.trim().is_empty() {
                errors.push(ValidationError::new(
                    "session.anon_key",
                    "required in provider_validated mode",
                ));
            }
            if session.access_token_cookie.trim().is_empty() {
                errors.push(ValidationError::new(
                    "session.access_token_cookie",
                    "required in provider_validated mode",
                ));
            }
            if session.validation_timeout_ms == 0 {
                errors.push(ValidationError::new(
                    "session.validation_timeout_ms",
                    "must be greater than 0",
                ));
            }
        }
    }
}

fn check_path(field: &str, path: &str, errors: &mut Vec<ValidationError>) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(
            field,
            format!("{path:?} must start with '/'"),
        ));
    }
}

/// Redirect targets end up in a `Location` header.
fn check_location_text(field: &str, text: &str, errors: &mut Vec<ValidationError>) {
    if HeaderValue::from_str(text).is_err() || text.chars().any(char::is_whitespace) {
        errors.push(ValidationError::new(
            field,
            format!("{text:?} cannot be sent in a Location header"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ActionConfig, HeaderConfig, RuleConfig};

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GateConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GateConfig::default();
        config.gate.sign_in_path = "sign-in".into();
        config.gate.redirect_status = 200;
        config.security.headers.push(HeaderConfig {
            name: "bad header".into(),
            value: "ok".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        let fields = fields(&errors);
        assert!(fields.contains(&"gate.sign_in_path"));
        assert!(fields.contains(&"gate.redirect_status"));
        assert!(fields.contains(&"security.headers[5].name"));
    }

    #[test]
    fn test_sign_in_under_protected_prefix_is_rejected() {
        let mut config = GateConfig::default();
        config.gate.sign_in_path = "/protected/sign-in".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(fields(&errors), vec!["gate.sign_in_path"]);
    }

    #[test]
    fn test_provider_mode_requires_url_and_key() {
        let mut config = GateConfig::default();
        config.session.mode = SessionModeConfig::ProviderValidated;

        let errors = validate_config(&config).unwrap_err();
        let fields = fields(&errors);
        assert!(fields.contains(&"session.provider_url"));
        assert!(fields.contains(&"session.anon_key"));

        config.session.provider_url = "https://project.supabase.co".into();
        config.session.anon_key = "anon".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_cookie_mode_requires_a_cookie_name() {
        let mut config = GateConfig::default();
        config.session.cookie_names = vec![" ".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(fields(&errors), vec!["session.cookie_names"]);
    }

    #[test]
    fn test_https_upstream_is_rejected() {
        let mut config = GateConfig::default();
        config.upstream.origin = Some("https://example.com".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(fields(&errors), vec!["upstream.origin"]);
    }

    #[test]
    fn test_rule_paths_are_checked() {
        let mut config = GateConfig::default();
        config.rules.push(RuleConfig {
            matcher: MatcherConfig::Prefix("api".into()),
            action: ActionConfig::Bypass,
        });
        config.rules.push(RuleConfig {
            matcher: MatcherConfig::Extension(vec![]),
            action: ActionConfig::Bypass,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(fields(&errors), vec!["rules[0].matcher", "rules[1].matcher"]);
    }

    #[test]
    fn test_redirect_targets_must_fit_a_location_header() {
        let mut config = GateConfig::default();
        config.gate.sign_in_path = "/sign-in\u{7f}".into();
        config.gate.protected_prefix = "/protected area".into();
        config.gate.return_to_param = "next\n".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["gate.protected_prefix", "gate.sign_in_path", "gate.return_to_param"]
        );
    }
}
