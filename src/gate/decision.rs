//! Gate outcomes and redirect construction.

use axum::http::{HeaderValue, StatusCode};
use serde::Serialize;
use url::form_urlencoded;

use crate::config::schema::GatePolicyConfig;
use crate::gate::GateError;

/// Why a request was redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// Protected path requested without session evidence.
    SignInRequired,
    /// Landing page requested with session evidence.
    AlreadySignedIn,
}

/// Terminal outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Gate skipped: no auth check, no headers.
    Bypass,
    /// Continue to normal handling, headers attached.
    PassThrough,
    /// Short-circuit with a redirect, headers attached.
    Redirect {
        location: HeaderValue,
        status: StatusCode,
        reason: RedirectReason,
    },
    /// Protected path without a session and no usable sign-in redirect.
    Deny,
}

impl GateDecision {
    /// Metric and log label.
    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Bypass => "bypass",
            GateDecision::PassThrough => "pass_through",
            GateDecision::Redirect {
                reason: RedirectReason::SignInRequired,
                ..
            } => "redirect_sign_in",
            GateDecision::Redirect {
                reason: RedirectReason::AlreadySignedIn,
                ..
            } => "redirect_protected",
            GateDecision::Deny => "deny",
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GateDecision::Redirect { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            GateDecision::Redirect { location, .. } => location.to_str().ok(),
            _ => None,
        }
    }

    /// Status the gate answers with itself, if it short-circuits.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GateDecision::Redirect { status, .. } => Some(*status),
            GateDecision::Deny => Some(StatusCode::FORBIDDEN),
            _ => None,
        }
    }
}

/// Where redirects point and how they are sent.
///
/// Both targets are checked as header values up front, so a bad
/// configuration fails at startup rather than on a request.
#[derive(Debug, Clone)]
pub struct RedirectTargets {
    sign_in_path: String,
    sign_in: HeaderValue,
    protected: HeaderValue,
    return_to_param: Option<String>,
    status: StatusCode,
}

impl RedirectTargets {
    pub fn new(
        sign_in_path: impl Into<String>,
        protected_path: impl Into<String>,
        return_to_param: Option<String>,
        status: StatusCode,
    ) -> Result<Self, GateError> {
        let sign_in_path = sign_in_path.into();
        let sign_in = location_value(&sign_in_path)?;
        let protected_path: String = protected_path.into();
        let protected = location_value(&protected_path)?;
        Ok(Self {
            sign_in_path,
            sign_in,
            protected,
            return_to_param,
            status,
        })
    }

    pub fn from_config(policy: &GatePolicyConfig) -> Result<Self, GateError> {
        let status = StatusCode::from_u16(policy.redirect_status)
            .ok()
            .filter(StatusCode::is_redirection)
            .ok_or(GateError::InvalidStatus(policy.redirect_status))?;
        let return_to_param = policy
            .include_return_to
            .then(|| policy.return_to_param.clone());
        Self::new(
            policy.sign_in_path.clone(),
            policy.protected_prefix.clone(),
            return_to_param,
            status,
        )
    }

    /// Redirect to sign-in, carrying `original_path` when configured.
    pub fn sign_in(&self, original_path: &str) -> Result<GateDecision, GateError> {
        let location = match &self.return_to_param {
            Some(param) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(param, original_path)
                    .finish();
                location_value(&format!("{}?{}", self.sign_in_path, query))?
            }
            None => self.sign_in.clone(),
        };
        Ok(self.redirect(location, RedirectReason::SignInRequired))
    }

    /// Redirect to the protected area.
    pub fn protected(&self) -> GateDecision {
        self.redirect(self.protected.clone(), RedirectReason::AlreadySignedIn)
    }

    fn redirect(&self, location: HeaderValue, reason: RedirectReason) -> GateDecision {
        GateDecision::Redirect {
            location,
            status: self.status,
            reason,
        }
    }

    /// Swap the sign-in path without checking it, to exercise the deny path.
    #[cfg(test)]
    pub(crate) fn with_unchecked_sign_in(mut self, sign_in_path: &str) -> Self {
        self.sign_in_path = sign_in_path.to_string();
        self
    }
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self {
            sign_in_path: "/sign-in".to_string(),
            sign_in: HeaderValue::from_static("/sign-in"),
            protected: HeaderValue::from_static("/protected"),
            return_to_param: Some("redirect_to".to_string()),
            status: StatusCode::TEMPORARY_REDIRECT,
        }
    }
}

fn location_value(location: &str) -> Result<HeaderValue, GateError> {
    HeaderValue::try_from(location).map_err(|_| GateError::InvalidLocation(location.to_string()))
}
