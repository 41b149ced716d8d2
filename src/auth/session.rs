//! Session evidence resolution.
//!
//! # Modes
//! - Cookie presence: any configured session cookie counts as a session
//! - Provider validated: the access token is checked by the auth provider
//!
//! # Design Decisions
//! - Evidence is recomputed per request and never cached
//! - Validator errors, timeouts and panics all resolve to `Anonymous`
//! - No access-token cookie means no network call

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::Serialize;
use thiserror::Error;

use crate::auth::cookies::CookieJar;
use crate::auth::provider::SupabaseValidator;
use crate::config::schema::{SessionConfig, SessionModeConfig};
use crate::observability::metrics;

/// Whether the requester holds an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvidence {
    Authenticated,
    Anonymous,
}

impl SessionEvidence {
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionEvidence::Authenticated)
    }
}

/// Failure of a session validation call.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("session validation request failed: {0}")]
    Transport(String),
    #[error("auth provider returned unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("auth provider response could not be decoded: {0}")]
    Decode(String),
    #[error("session validation timed out after {0:?}")]
    Timeout(Duration),
    #[error("session validator panicked")]
    Panicked,
    #[error("session validator misconfigured: {0}")]
    Misconfigured(String),
}

/// External check of an access token.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `Ok(true)` when the token belongs to a live session.
    async fn validate(&self, access_token: &str) -> Result<bool, ValidatorError>;
}

/// How evidence is established.
#[derive(Clone)]
pub enum SessionMode {
    CookiePresence {
        cookie_names: Vec<String>,
    },
    ProviderValidated {
        access_token_cookie: String,
        validator: Arc<dyn SessionValidator>,
        timeout: Duration,
    },
}

impl fmt::Debug for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::CookiePresence { cookie_names } => f
                .debug_struct("CookiePresence")
                .field("cookie_names", cookie_names)
                .finish(),
            SessionMode::ProviderValidated {
                access_token_cookie,
                timeout,
                ..
            } => f
                .debug_struct("ProviderValidated")
                .field("access_token_cookie", access_token_cookie)
                .field("timeout", timeout)
                .finish_non_exhaustive(),
        }
    }
}

/// Turns a cookie jar into session evidence.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    mode: SessionMode,
}

impl SessionResolver {
    pub fn new(mode: SessionMode) -> Self {
        Self { mode }
    }

    pub fn cookie_presence<I, S>(cookie_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SessionMode::CookiePresence {
            cookie_names: cookie_names.into_iter().map(Into::into).collect(),
        })
    }

    pub fn provider_validated(
        access_token_cookie: impl Into<String>,
        validator: Arc<dyn SessionValidator>,
        timeout: Duration,
    ) -> Self {
        Self::new(SessionMode::ProviderValidated {
            access_token_cookie: access_token_cookie.into(),
            validator,
            timeout,
        })
    }

    /// Build the configured mode; provider mode talks to Supabase auth.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ValidatorError> {
        match config.mode {
            SessionModeConfig::CookiePresence => {
                Ok(Self::cookie_presence(config.cookie_names.iter().cloned()))
            }
            SessionModeConfig::ProviderValidated => {
                let validator = SupabaseValidator::new(&config.provider_url, &config.anon_key)?;
                Ok(Self::provider_validated(
                    config.access_token_cookie.clone(),
                    Arc::new(validator),
                    Duration::from_millis(config.validation_timeout_ms),
                ))
            }
        }
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            SessionMode::CookiePresence { .. } => "cookie_presence",
            SessionMode::ProviderValidated { .. } => "provider_validated",
        }
    }

    pub async fn resolve(&self, jar: &CookieJar) -> SessionEvidence {
        match &self.mode {
            SessionMode::CookiePresence { cookie_names } => {
                if cookie_names.iter().any(|name| jar.contains(name)) {
                    SessionEvidence::Authenticated
                } else {
                    SessionEvidence::Anonymous
                }
            }
            SessionMode::ProviderValidated {
                access_token_cookie,
                validator,
                timeout,
            } => {
                let Some(token) = jar.get(access_token_cookie).filter(|t| !t.is_empty()) else {
                    return SessionEvidence::Anonymous;
                };
                validate_with_deadline(validator.as_ref(), token, *timeout).await
            }
        }
    }
}

async fn validate_with_deadline(
    validator: &dyn SessionValidator,
    token: &str,
    timeout: Duration,
) -> SessionEvidence {
    let started = Instant::now();
    let call = AssertUnwindSafe(validator.validate(token)).catch_unwind();

    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(ValidatorError::Panicked),
        Err(_) => Err(ValidatorError::Timeout(timeout)),
    };

    match outcome {
        Ok(true) => {
            metrics::record_session_validation("valid", started);
            SessionEvidence::Authenticated
        }
        Ok(false) => {
            metrics::record_session_validation("invalid", started);
            SessionEvidence::Anonymous
        }
        Err(e) => {
            metrics::record_session_validation("error", started);
            tracing::warn!(error = %e, "Session validation failed, treating request as anonymous");
            SessionEvidence::Anonymous
        }
    }
}
