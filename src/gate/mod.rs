//! Request gate.
//!
//! # Data Flow
//! ```text
//! Request (path, cookies)
//!     → routing::normalize_path
//!     → routing::RuleSet (first matching rule → GateAction)
//!     → Bypass            → Bypassed
//!     → PassThrough       → PassThrough
//!     → RequireSession    → auth::SessionResolver → PassThrough | Redirect(sign-in) | Deny
//!     → RedirectIfAuthenticated
//!                         → auth::SessionResolver → Redirect(protected) | PassThrough
//!
//! middleware.rs:
//!     evaluate (errors and panics → PassThrough)
//!     → attach security::SecurityHeaders unless Bypassed
//! ```
//!
//! # Design Decisions
//! - Stateless: every field is immutable after construction
//! - Session evidence is only resolved when a rule needs it
//! - Internal faults fail open, missing evidence on protected paths fails closed

pub mod decision;
pub mod middleware;

use thiserror::Error;

use crate::auth::{CookieJar, SessionResolver, ValidatorError};
use crate::config::GateConfig;
use crate::routing::{normalize_path, GateAction, RuleSet};
use crate::security::{HeaderSetError, SecurityHeaders};

pub use decision::{GateDecision, RedirectReason, RedirectTargets};
pub use middleware::{gate_middleware, with_gate};

/// Errors raised while building or evaluating the gate.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("redirect location {0:?} is not a valid header value")]
    InvalidLocation(String),
    #[error("status {0} is not a redirect status")]
    InvalidStatus(u16),
    #[error("security headers: {0}")]
    Headers(#[from] HeaderSetError),
    #[error("session validator: {0}")]
    Session(#[from] ValidatorError),
}

/// Per-request decision function plus the immutable data it needs.
#[derive(Debug)]
pub struct Gate {
    rules: RuleSet,
    headers: SecurityHeaders,
    session: SessionResolver,
    redirects: RedirectTargets,
}

impl Gate {
    pub fn new(
        rules: RuleSet,
        headers: SecurityHeaders,
        session: SessionResolver,
        redirects: RedirectTargets,
    ) -> Self {
        Self {
            rules,
            headers,
            session,
            redirects,
        }
    }

    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        Ok(Self::new(
            RuleSet::from_config(&config.gate, &config.rules),
            SecurityHeaders::from_config(&config.security)?,
            SessionResolver::from_config(&config.session)?,
            RedirectTargets::from_config(&config.gate)?,
        ))
    }

    /// Same as `from_config` but with a caller-supplied session resolver.
    pub fn with_session(config: &GateConfig, session: SessionResolver) -> Result<Self, GateError> {
        Ok(Self::new(
            RuleSet::from_config(&config.gate, &config.rules),
            SecurityHeaders::from_config(&config.security)?,
            session,
            RedirectTargets::from_config(&config.gate)?,
        ))
    }

    pub fn headers(&self) -> &SecurityHeaders {
        &self.headers
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn session(&self) -> &SessionResolver {
        &self.session
    }

    /// Decide what happens to a request for `path` carrying `jar`.
    ///
    /// `path` is canonicalized first, so encoded or doubled separators
    /// cannot route around a rule.
    pub async fn evaluate(&self, path: &str, jar: &CookieJar) -> Result<GateDecision, GateError> {
        let path = normalize_path(path);
        match self.rules.resolve(&path) {
            GateAction::Bypass => Ok(GateDecision::Bypass),
            GateAction::PassThrough => Ok(GateDecision::PassThrough),
            GateAction::RequireSession => {
                if self.session.resolve(jar).await.is_authenticated() {
                    return Ok(GateDecision::PassThrough);
                }
                // Past this point the request is known to be anonymous: never let it through.
                match self.redirects.sign_in(&path) {
                    Ok(decision) => Ok(decision),
                    Err(e) => {
                        tracing::error!(path = %path, error = %e, "Sign-in redirect unavailable, denying request");
                        Ok(GateDecision::Deny)
                    }
                }
            }
            GateAction::RedirectIfAuthenticated => {
                if self.session.resolve(jar).await.is_authenticated() {
                    Ok(self.redirects.protected())
                } else {
                    Ok(GateDecision::PassThrough)
                }
            }
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        let config = GateConfig::default();
        Self::new(
            RuleSet::defaults(&config.gate),
            SecurityHeaders::standard(),
            SessionResolver::cookie_presence(config.session.cookie_names),
            RedirectTargets::default(),
        )
    }
}
