//! Ordered `(matcher, action)` rules.
//!
//! # Responsibilities
//! - Compile rule configuration into matchers
//! - Derive the default rule set from the gate policy
//! - Resolve a path to the action of the first matching rule
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan, first match wins
//! - No match means plain pass-through

use serde::Serialize;

use crate::config::schema::{ActionConfig, GatePolicyConfig, MatcherConfig, RuleConfig};
use crate::routing::matcher::{AnyMatcher, ExactMatcher, ExtensionMatcher, Matcher, PrefixMatcher};

/// What the gate does with a request whose path matched a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateAction {
    /// Skip the gate: no auth check, no headers.
    Bypass,
    /// Redirect to sign-in unless session evidence exists.
    RequireSession,
    /// Redirect to the protected area when session evidence exists.
    RedirectIfAuthenticated,
    /// Continue with security headers attached.
    PassThrough,
}

impl From<ActionConfig> for GateAction {
    fn from(action: ActionConfig) -> Self {
        match action {
            ActionConfig::Bypass => GateAction::Bypass,
            ActionConfig::RequireSession => GateAction::RequireSession,
            ActionConfig::RedirectIfAuthenticated => GateAction::RedirectIfAuthenticated,
            ActionConfig::PassThrough => GateAction::PassThrough,
        }
    }
}

/// A single compiled rule.
#[derive(Debug)]
pub struct Rule {
    matcher: Box<dyn Matcher>,
    action: GateAction,
}

impl Rule {
    pub fn new(matcher: impl Matcher + 'static, action: GateAction) -> Self {
        Self {
            matcher: Box::new(matcher),
            action,
        }
    }

    fn from_config(config: &RuleConfig) -> Self {
        let matcher: Box<dyn Matcher> = match &config.matcher {
            MatcherConfig::Exact(path) => Box::new(ExactMatcher::new(path.clone())),
            MatcherConfig::Prefix(prefix) => Box::new(PrefixMatcher::new(prefix.clone())),
            MatcherConfig::Extension(exts) => Box::new(ExtensionMatcher::new(exts)),
            MatcherConfig::Any => Box::new(AnyMatcher),
        };
        Self {
            matcher,
            action: config.action.into(),
        }
    }

    pub fn action(&self) -> GateAction {
        self.action
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// Serializable view of a rule for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub matcher: String,
    pub action: GateAction,
}

/// Ordered rules, evaluated top-down.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile explicit rules, or derive the defaults when none are given.
    pub fn from_config(policy: &GatePolicyConfig, rules: &[RuleConfig]) -> Self {
        if rules.is_empty() {
            Self::defaults(policy)
        } else {
            Self::new(rules.iter().map(Rule::from_config).collect())
        }
    }

    /// Bypass framework assets and API routes, guard the protected prefix,
    /// bypass static files elsewhere, and optionally bounce signed-in
    /// visitors off the landing page.
    pub fn defaults(policy: &GatePolicyConfig) -> Self {
        let mut rules = Vec::new();

        for prefix in &policy.bypass_prefixes {
            rules.push(Rule::new(PrefixMatcher::new(prefix.clone()), GateAction::Bypass));
        }
        for path in &policy.bypass_exact {
            rules.push(Rule::new(ExactMatcher::new(path.clone()), GateAction::Bypass));
        }

        // Ahead of the extension bypass: files under the protected prefix stay gated.
        rules.push(Rule::new(
            PrefixMatcher::new(policy.protected_prefix.clone()),
            GateAction::RequireSession,
        ));

        if !policy.bypass_extensions.is_empty() {
            rules.push(Rule::new(
                ExtensionMatcher::new(&policy.bypass_extensions),
                GateAction::Bypass,
            ));
        }

        if policy.redirect_authenticated_home {
            rules.push(Rule::new(
                ExactMatcher::new(policy.home_path.clone()),
                GateAction::RedirectIfAuthenticated,
            ));
        }

        Self::new(rules)
    }

    /// Action of the first rule matching `path`.
    pub fn resolve(&self, path: &str) -> GateAction {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(Rule::action)
            .unwrap_or(GateAction::PassThrough)
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules
            .iter()
            .map(|rule| RuleSummary {
                matcher: rule.matcher.describe(),
                action: rule.action,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
