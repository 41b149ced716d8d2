//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variables that override file values.
pub const ENV_BIND_ADDRESS: &str = "GATE_BIND_ADDRESS";
pub const ENV_UPSTREAM_ORIGIN: &str = "GATE_UPSTREAM_ORIGIN";
pub const ENV_PROVIDER_URL: &str = "GATE_AUTH_PROVIDER_URL";
pub const ENV_ANON_KEY: &str = "GATE_AUTH_ANON_KEY";

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load from `path` when given, otherwise start from defaults.
/// Environment overrides apply in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(GateConfig::default(), |key| std::env::var(key).ok()),
    }
}

/// Parse, apply environment overrides, and validate a TOML document.
pub fn parse_config(content: &str) -> Result<GateConfig, ConfigError> {
    let config: GateConfig = toml::from_str(content)?;
    finish(config, |key| std::env::var(key).ok())
}

fn finish(
    mut config: GateConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<GateConfig, ConfigError> {
    apply_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay secrets and deployment-specific values from the environment.
pub fn apply_overrides(config: &mut GateConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(origin) = lookup(ENV_UPSTREAM_ORIGIN) {
        config.upstream.origin = Some(origin);
    }
    if let Some(url) = lookup(ENV_PROVIDER_URL) {
        config.session.provider_url = url;
    }
    if let Some(key) = lookup(ENV_ANON_KEY) {
        config.session.anon_key = key;
    }
}
