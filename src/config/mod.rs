//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → compiled once into the Gate and shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the header set and rules never change
//!   for the lifetime of the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use validation::{validate_config, ValidationError};
pub use schema::{
    ActionConfig, GateConfig, GatePolicyConfig, HeaderConfig, ListenerConfig, MatcherConfig,
    ObservabilityConfig, RuleConfig, SecurityConfig, SessionConfig, SessionModeConfig,
    TimeoutConfig, TlsConfig, UpstreamConfig,
};
