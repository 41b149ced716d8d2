//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::security::headers::STANDARD_HEADERS;

/// Root configuration for the request gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Origin that receives requests the gate lets through.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Path policy: protected area, sign-in target, bypass lists.
    pub gate: GatePolicyConfig,

    /// How session evidence is established.
    pub session: SessionConfig,

    /// Response hardening headers.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Explicit rule list. When empty, rules are derived from `gate`.
    pub rules: Vec<RuleConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin URL (e.g., "http://127.0.0.1:3000"). Without one, pass-through
    /// requests are answered with an empty 200.
    pub origin: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Path policy for the gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatePolicyConfig {
    /// Path prefix that requires session evidence.
    pub protected_prefix: String,

    /// Where unauthenticated requests for protected paths are sent.
    pub sign_in_path: String,

    /// Landing page path.
    pub home_path: String,

    /// Query parameter carrying the original path on sign-in redirects.
    pub return_to_param: String,

    /// Attach `return_to_param` to sign-in redirects.
    pub include_return_to: bool,

    /// Send authenticated visitors of `home_path` to `protected_prefix`.
    pub redirect_authenticated_home: bool,

    /// Status code used for redirects (301, 302, 303, 307 or 308).
    pub redirect_status: u16,

    /// Path prefixes that skip the gate entirely.
    pub bypass_prefixes: Vec<String>,

    /// Exact paths that skip the gate entirely.
    pub bypass_exact: Vec<String>,

    /// File extensions (without the dot) that skip the gate entirely.
    pub bypass_extensions: Vec<String>,
}

impl Default for GatePolicyConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/protected".to_string(),
            sign_in_path: "/sign-in".to_string(),
            home_path: "/".to_string(),
            return_to_param: "redirect_to".to_string(),
            include_return_to: true,
            redirect_authenticated_home: true,
            redirect_status: 307,
            bypass_prefixes: vec![
                "/_next/static".to_string(),
                "/_next/image".to_string(),
                "/api".to_string(),
            ],
            bypass_exact: vec!["/favicon.ico".to_string()],
            bypass_extensions: [
                "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "css", "js", "map",
                "woff", "woff2", "ttf", "txt", "xml", "webmanifest",
            ]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
        }
    }
}

/// Session evidence strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionModeConfig {
    /// Any configured session cookie present means authenticated.
    #[default]
    CookiePresence,
    /// The access token is checked against the auth provider.
    ProviderValidated,
}

/// Session evidence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: SessionModeConfig,

    /// Cookies whose presence counts as session evidence.
    pub cookie_names: Vec<String>,

    /// Cookie holding the access token sent to the provider.
    pub access_token_cookie: String,

    /// Auth provider base URL (e.g., "https://xyz.supabase.co").
    pub provider_url: String,

    /// Anonymous API key sent with validation calls.
    pub anon_key: String,

    /// Upper bound on a single validation call in milliseconds.
    pub validation_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionModeConfig::CookiePresence,
            cookie_names: vec![
                "sb-access-token".to_string(),
                "sb-refresh-token".to_string(),
            ],
            access_token_cookie: "sb-access-token".to_string(),
            provider_url: String::new(),
            anon_key: String::new(),
            validation_timeout_ms: 300,
        }
    }
}

/// A single response header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderConfig {
    pub name: String,
    pub value: String,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Headers set on every gated response, in order.
    pub headers: Vec<HeaderConfig>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            headers: STANDARD_HEADERS
                .iter()
                .map(|(name, value)| HeaderConfig {
                    name: name.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One `(matcher, action)` rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    pub matcher: MatcherConfig,
    pub action: ActionConfig,
}

/// Path condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherConfig {
    /// Path equals the value.
    Exact(String),
    /// Path is the value or lies below it.
    Prefix(String),
    /// Last path segment carries one of the extensions.
    Extension(Vec<String>),
    /// Every path.
    Any,
}

/// What the gate does with a matching request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionConfig {
    Bypass,
    RequireSession,
    RedirectIfAuthenticated,
    PassThrough,
}
